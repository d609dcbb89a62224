//! Repository ports over the four-table store
//!
//! Repositories carry no scoring logic and never load a whole table to
//! filter in memory: every lookup is an ID lookup, a vector search or an
//! indexed predicate. Implementations are wrapped with the DATABASE
//! resilience profile by the application container.

use crate::entities::{CatalogEntry, CategoryRow, ChunkRow, ConceptRow};
use crate::error::Result;
use crate::value_objects::VectorHit;
use async_trait::async_trait;

/// Catalog (document) table operations
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a batch of catalog rows
    async fn bulk_insert(&self, rows: Vec<CatalogEntry>) -> Result<()>;

    /// Delete the row for a filename; returns the number of rows removed
    async fn delete_by_filename(&self, filename: &str) -> Result<usize>;

    /// Number of catalog rows
    async fn count(&self) -> Result<usize>;

    /// Primary-key lookup
    async fn find_by_id(&self, id: i32) -> Result<Option<CatalogEntry>>;

    /// Batched primary-key lookup; missing ids are silently skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CatalogEntry>>;

    /// Lookup by source filename
    async fn find_by_source(&self, filename: &str) -> Result<Option<CatalogEntry>>;

    /// Documents filed under a category
    async fn find_by_category(&self, category_id: i32) -> Result<Vec<CatalogEntry>>;

    /// Union of chunk concept ids over a category's documents
    async fn concepts_in_category(&self, category_id: i32) -> Result<Vec<i32>>;

    /// Nearest documents by embedding, ascending distance
    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<CatalogEntry>>>;
}

/// Chunk table operations
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Insert a batch of chunk rows
    async fn bulk_insert(&self, rows: Vec<ChunkRow>) -> Result<()>;

    /// Cascade-delete all chunks of a document; returns the number removed
    async fn delete_by_catalog_id(&self, catalog_id: i32) -> Result<usize>;

    /// Number of chunk rows
    async fn count(&self) -> Result<usize>;

    /// Primary-key lookup
    async fn find_by_id(&self, id: i32) -> Result<Option<ChunkRow>>;

    /// Batched primary-key lookup; missing ids are silently skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ChunkRow>>;

    /// Chunks mentioning a concept, resolved by concept name
    ///
    /// Resolves the name to a concept row, then fetches chunks whose
    /// `catalog_id` is in the concept's documents and whose `concept_ids`
    /// contains the concept's id, up to `limit`.
    async fn find_by_concept_name(&self, name: &str, limit: usize) -> Result<Vec<ChunkRow>>;

    /// Chunks of one document, resolved by source filename
    async fn find_by_source(&self, filename: &str, limit: usize) -> Result<Vec<ChunkRow>>;

    /// Chunks of one document by catalog id
    async fn find_by_catalog_id(&self, catalog_id: i32, limit: usize) -> Result<Vec<ChunkRow>>;

    /// Nearest chunks by embedding, ascending distance
    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ChunkRow>>>;
}

/// Concept table operations
#[async_trait]
pub trait ConceptRepository: Send + Sync {
    /// Insert a batch of concept rows (rebuild path; no merging)
    async fn bulk_insert(&self, rows: Vec<ConceptRow>) -> Result<()>;

    /// Merge a concept contribution into the table
    ///
    /// Inserts the row if the concept is new; otherwise unions `catalog_ids`
    /// (set semantics, sorted), unions the lexical fields, replaces
    /// `related_concept_ids`, and recomputes `weight`. The read-modify-write
    /// is serialized per concept id. Returns the stored row.
    async fn merge(&self, row: ConceptRow) -> Result<ConceptRow>;

    /// Number of concept rows
    async fn count(&self) -> Result<usize>;

    /// Primary-key lookup
    async fn find_by_id(&self, id: i32) -> Result<Option<ConceptRow>>;

    /// Batched primary-key lookup; missing ids are silently skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ConceptRow>>;

    /// Lookup by normalized concept name
    async fn find_by_name(&self, name: &str) -> Result<Option<ConceptRow>>;

    /// Concepts matching a query: vector neighbors plus prefix matches
    async fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>>;

    /// Related concepts of a named concept, strongest first
    async fn find_related(&self, name: &str, limit: usize) -> Result<Vec<ConceptRow>>;

    /// Nearest concepts by embedding, ascending distance
    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>>;
}

/// Category table operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert or update a category, replacing the stored document count
    async fn upsert(&self, row: CategoryRow) -> Result<()>;

    /// Number of category rows
    async fn count(&self) -> Result<usize>;

    /// All categories, sorted by name
    async fn find_all(&self) -> Result<Vec<CategoryRow>>;

    /// Lookup by lower-cased name
    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRow>>;

    /// Batched primary-key lookup; missing ids are silently skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CategoryRow>>;
}
