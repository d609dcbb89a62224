//! Table stores
//!
//! The storage seam beneath the repositories: four tables of integer-keyed
//! rows with a JSON payload, a float32 vector, secondary indexes over an
//! ordered key space, and approximate nearest-neighbor search. Two backends
//! ship in-core: a non-persistent memory store and a JSON-lines filesystem
//! store. A dedicated vector database engine would implement the same trait.

mod filesystem;
mod memory;
mod state;

pub use filesystem::FilesystemTableStore;
pub use memory::MemoryTableStore;

use async_trait::async_trait;
use libris_domain::error::Result;
use libris_domain::ids::normalize_concept;
use serde_json::Value;

/// The four tables of the corpus store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Document catalog
    Catalog,
    /// Passage chunks
    Chunks,
    /// Concept vocabulary
    Concepts,
    /// Category taxonomy
    Categories,
}

impl Table {
    /// All tables, in persistence order
    pub const ALL: [Table; 4] = [
        Table::Catalog,
        Table::Chunks,
        Table::Concepts,
        Table::Categories,
    ];

    /// Stable table name used in file names and index keys
    pub fn name(self) -> &'static str {
        match self {
            Table::Catalog => "catalog",
            Table::Chunks => "chunks",
            Table::Concepts => "concepts",
            Table::Categories => "categories",
        }
    }
}

/// One stored row: primary key, search vector and JSON payload
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredRow {
    /// Primary key
    pub id: i32,
    /// Vector indexed for similarity search
    pub vector: Vec<f32>,
    /// Full row payload
    pub payload: Value,
}

/// Secondary index lookup keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    /// Catalog row by source filename
    CatalogFilename(String),
    /// Catalog rows filed under a category
    CatalogCategory(i32),
    /// Chunks of one document
    ChunkCatalog(i32),
    /// Concept row by normalized name
    ConceptName(String),
    /// Category row by lower-cased name
    CategoryName(String),
}

impl IndexKey {
    /// Encode the key into the store's ordered key space
    pub fn encode(&self) -> String {
        match self {
            IndexKey::CatalogFilename(name) => format!("catalog.filename:{}", name),
            IndexKey::CatalogCategory(id) => format!("catalog.category:{:010}", id),
            IndexKey::ChunkCatalog(id) => format!("chunks.catalog:{:010}", id),
            IndexKey::ConceptName(name) => format!("concepts.name:{}", name),
            IndexKey::CategoryName(name) => format!("categories.name:{}", name),
        }
    }

    /// Key-space prefix for concept-name prefix scans
    pub fn concept_name_prefix(prefix: &str) -> String {
        format!("concepts.name:{}", prefix)
    }
}

/// Storage operations the repositories are built on
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert rows; an existing id is replaced
    async fn insert(&self, table: Table, rows: Vec<StoredRow>) -> Result<()>;

    /// Insert or replace one row
    async fn upsert(&self, table: Table, row: StoredRow) -> Result<()>;

    /// Delete rows by id; returns the number actually removed
    async fn delete(&self, table: Table, ids: &[i32]) -> Result<usize>;

    /// Primary-key lookup
    async fn get(&self, table: Table, id: i32) -> Result<Option<StoredRow>>;

    /// Batched lookup preserving input order; missing ids are skipped
    async fn get_many(&self, table: Table, ids: &[i32]) -> Result<Vec<StoredRow>>;

    /// Row count
    async fn count(&self, table: Table) -> Result<usize>;

    /// Ids under a secondary index key, ascending
    async fn lookup_index(&self, key: &IndexKey) -> Result<Vec<i32>>;

    /// Ids whose index key starts with the prefix, in key order
    async fn prefix_scan(&self, prefix: &str, limit: usize) -> Result<Vec<i32>>;

    /// All ids of a table, ascending
    async fn all_ids(&self, table: Table) -> Result<Vec<i32>>;

    /// Nearest rows by cosine distance, ascending `(id, distance)`
    async fn vector_search(
        &self,
        table: Table,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<(i32, f32)>>;

    /// Short backend identifier for logs and status payloads
    fn provider_name(&self) -> &str;
}

/// Index keys contributed by one row of a table
///
/// Extracted from the payload fields the schema guarantees; a payload missing
/// them simply contributes no index entries.
pub(crate) fn index_entries(table: Table, row: &StoredRow) -> Vec<IndexKey> {
    let mut keys = Vec::new();
    match table {
        Table::Catalog => {
            if let Some(filename) = row.payload.get("filename").and_then(Value::as_str) {
                keys.push(IndexKey::CatalogFilename(filename.to_string()));
            }
            if let Some(ids) = row.payload.get("category_ids").and_then(Value::as_array) {
                for id in ids.iter().filter_map(Value::as_i64) {
                    keys.push(IndexKey::CatalogCategory(id as i32));
                }
            }
        }
        Table::Chunks => {
            if let Some(id) = row.payload.get("catalog_id").and_then(Value::as_i64) {
                keys.push(IndexKey::ChunkCatalog(id as i32));
            }
        }
        Table::Concepts => {
            if let Some(name) = row.payload.get("concept").and_then(Value::as_str) {
                keys.push(IndexKey::ConceptName(normalize_concept(name)));
            }
        }
        Table::Categories => {
            if let Some(name) = row.payload.get("name").and_then(Value::as_str) {
                keys.push(IndexKey::CategoryName(name.to_lowercase()));
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keys_order_numeric_ids_lexicographically() {
        let a = IndexKey::ChunkCatalog(42).encode();
        let b = IndexKey::ChunkCatalog(1000).encode();
        assert!(a < b);
    }

    #[test]
    fn catalog_rows_index_filename_and_categories() {
        let row = StoredRow {
            id: 1,
            vector: vec![],
            payload: serde_json::json!({
                "filename": "book.txt",
                "category_ids": [7, 9],
            }),
        };
        let keys = index_entries(Table::Catalog, &row);
        assert!(keys.contains(&IndexKey::CatalogFilename("book.txt".to_string())));
        assert!(keys.contains(&IndexKey::CatalogCategory(7)));
        assert!(keys.contains(&IndexKey::CatalogCategory(9)));
    }

    #[test]
    fn concept_names_are_normalized_in_the_index() {
        let row = StoredRow {
            id: 1,
            vector: vec![],
            payload: serde_json::json!({"concept": "Repository  Pattern"}),
        };
        let keys = index_entries(Table::Concepts, &row);
        assert_eq!(
            keys,
            vec![IndexKey::ConceptName("repository pattern".to_string())]
        );
    }
}
