//! Resilient port decorators
//!
//! Wrap the repository and provider ports with the executor so every call
//! runs under its profile: repository reads and writes under DATABASE,
//! vector search under SEARCH, remote embedding under EMBEDDING, and LLM
//! extraction under LLM_API. Services stay unaware of the resilience layer;
//! the container decides what gets wrapped.

use std::sync::Arc;

use async_trait::async_trait;

use libris_domain::entities::{CatalogEntry, CategoryRow, ChunkRow, ConceptRow};
use libris_domain::error::Result;
use libris_domain::ports::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptExtractor, ConceptRepository,
    EmbeddingProvider,
};
use libris_domain::value_objects::{Embedding, ExtractedConcepts, VectorHit};

use super::degradation::GracefulDegradation;
use super::executor::{ResilienceProfile, ResilientExecutor};

/// Catalog repository under DATABASE/SEARCH profiles
pub struct ResilientCatalogRepository {
    inner: Arc<dyn CatalogRepository>,
    executor: Arc<ResilientExecutor>,
    database: ResilienceProfile,
    search: ResilienceProfile,
}

impl ResilientCatalogRepository {
    /// Wrap a repository
    pub fn new(
        inner: Arc<dyn CatalogRepository>,
        executor: Arc<ResilientExecutor>,
        database: ResilienceProfile,
        search: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            database,
            search,
        }
    }
}

#[async_trait]
impl CatalogRepository for ResilientCatalogRepository {
    async fn bulk_insert(&self, rows: Vec<CatalogEntry>) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let rows = Arc::new(rows);
        self.executor
            .execute("catalog.bulk_insert", &self.database, move || {
                let inner = Arc::clone(&inner);
                let rows = Arc::clone(&rows);
                async move { inner.bulk_insert(rows.as_ref().clone()).await }
            })
            .await
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        let filename = filename.to_string();
        self.executor
            .execute("catalog.delete_by_filename", &self.database, move || {
                let inner = Arc::clone(&inner);
                let filename = filename.clone();
                async move { inner.delete_by_filename(&filename).await }
            })
            .await
    }

    async fn count(&self) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("catalog.count", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.count().await }
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CatalogEntry>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("catalog.find_by_id", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_by_id(id).await }
            })
            .await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CatalogEntry>> {
        let inner = Arc::clone(&self.inner);
        let ids = ids.to_vec();
        self.executor
            .execute("catalog.find_by_ids", &self.database, move || {
                let inner = Arc::clone(&inner);
                let ids = ids.clone();
                async move { inner.find_by_ids(&ids).await }
            })
            .await
    }

    async fn find_by_source(&self, filename: &str) -> Result<Option<CatalogEntry>> {
        let inner = Arc::clone(&self.inner);
        let filename = filename.to_string();
        self.executor
            .execute("catalog.find_by_source", &self.database, move || {
                let inner = Arc::clone(&inner);
                let filename = filename.clone();
                async move { inner.find_by_source(&filename).await }
            })
            .await
    }

    async fn find_by_category(&self, category_id: i32) -> Result<Vec<CatalogEntry>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("catalog.find_by_category", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_by_category(category_id).await }
            })
            .await
    }

    async fn concepts_in_category(&self, category_id: i32) -> Result<Vec<i32>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("catalog.concepts_in_category", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.concepts_in_category(category_id).await }
            })
            .await
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<CatalogEntry>>> {
        let inner = Arc::clone(&self.inner);
        let vector = vector.to_vec();
        self.executor
            .execute("catalog.vector_search", &self.search, move || {
                let inner = Arc::clone(&inner);
                let vector = vector.clone();
                async move { inner.vector_search(&vector, limit).await }
            })
            .await
    }
}

/// Chunk repository under DATABASE/SEARCH profiles
pub struct ResilientChunkRepository {
    inner: Arc<dyn ChunkRepository>,
    executor: Arc<ResilientExecutor>,
    database: ResilienceProfile,
    search: ResilienceProfile,
}

impl ResilientChunkRepository {
    /// Wrap a repository
    pub fn new(
        inner: Arc<dyn ChunkRepository>,
        executor: Arc<ResilientExecutor>,
        database: ResilienceProfile,
        search: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            database,
            search,
        }
    }
}

#[async_trait]
impl ChunkRepository for ResilientChunkRepository {
    async fn bulk_insert(&self, rows: Vec<ChunkRow>) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let rows = Arc::new(rows);
        self.executor
            .execute("chunks.bulk_insert", &self.database, move || {
                let inner = Arc::clone(&inner);
                let rows = Arc::clone(&rows);
                async move { inner.bulk_insert(rows.as_ref().clone()).await }
            })
            .await
    }

    async fn delete_by_catalog_id(&self, catalog_id: i32) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("chunks.delete_by_catalog_id", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.delete_by_catalog_id(catalog_id).await }
            })
            .await
    }

    async fn count(&self) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("chunks.count", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.count().await }
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ChunkRow>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("chunks.find_by_id", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_by_id(id).await }
            })
            .await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ChunkRow>> {
        let inner = Arc::clone(&self.inner);
        let ids = ids.to_vec();
        self.executor
            .execute("chunks.find_by_ids", &self.database, move || {
                let inner = Arc::clone(&inner);
                let ids = ids.clone();
                async move { inner.find_by_ids(&ids).await }
            })
            .await
    }

    async fn find_by_concept_name(&self, name: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        self.executor
            .execute("chunks.find_by_concept_name", &self.database, move || {
                let inner = Arc::clone(&inner);
                let name = name.clone();
                async move { inner.find_by_concept_name(&name, limit).await }
            })
            .await
    }

    async fn find_by_source(&self, filename: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let inner = Arc::clone(&self.inner);
        let filename = filename.to_string();
        self.executor
            .execute("chunks.find_by_source", &self.database, move || {
                let inner = Arc::clone(&inner);
                let filename = filename.clone();
                async move { inner.find_by_source(&filename, limit).await }
            })
            .await
    }

    async fn find_by_catalog_id(&self, catalog_id: i32, limit: usize) -> Result<Vec<ChunkRow>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("chunks.find_by_catalog_id", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_by_catalog_id(catalog_id, limit).await }
            })
            .await
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ChunkRow>>> {
        let inner = Arc::clone(&self.inner);
        let vector = vector.to_vec();
        self.executor
            .execute("chunks.vector_search", &self.search, move || {
                let inner = Arc::clone(&inner);
                let vector = vector.clone();
                async move { inner.vector_search(&vector, limit).await }
            })
            .await
    }
}

/// Concept repository under DATABASE/SEARCH profiles
pub struct ResilientConceptRepository {
    inner: Arc<dyn ConceptRepository>,
    executor: Arc<ResilientExecutor>,
    database: ResilienceProfile,
    search: ResilienceProfile,
}

impl ResilientConceptRepository {
    /// Wrap a repository
    pub fn new(
        inner: Arc<dyn ConceptRepository>,
        executor: Arc<ResilientExecutor>,
        database: ResilienceProfile,
        search: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            database,
            search,
        }
    }
}

#[async_trait]
impl ConceptRepository for ResilientConceptRepository {
    async fn bulk_insert(&self, rows: Vec<ConceptRow>) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let rows = Arc::new(rows);
        self.executor
            .execute("concepts.bulk_insert", &self.database, move || {
                let inner = Arc::clone(&inner);
                let rows = Arc::clone(&rows);
                async move { inner.bulk_insert(rows.as_ref().clone()).await }
            })
            .await
    }

    async fn merge(&self, row: ConceptRow) -> Result<ConceptRow> {
        let inner = Arc::clone(&self.inner);
        let row = Arc::new(row);
        self.executor
            .execute("concepts.merge", &self.database, move || {
                let inner = Arc::clone(&inner);
                let row = Arc::clone(&row);
                async move { inner.merge(row.as_ref().clone()).await }
            })
            .await
    }

    async fn count(&self) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("concepts.count", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.count().await }
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ConceptRow>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("concepts.find_by_id", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_by_id(id).await }
            })
            .await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ConceptRow>> {
        let inner = Arc::clone(&self.inner);
        let ids = ids.to_vec();
        self.executor
            .execute("concepts.find_by_ids", &self.database, move || {
                let inner = Arc::clone(&inner);
                let ids = ids.clone();
                async move { inner.find_by_ids(&ids).await }
            })
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ConceptRow>> {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        self.executor
            .execute("concepts.find_by_name", &self.database, move || {
                let inner = Arc::clone(&inner);
                let name = name.clone();
                async move { inner.find_by_name(&name).await }
            })
            .await
    }

    async fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>> {
        let inner = Arc::clone(&self.inner);
        let query_vector = query_vector.to_vec();
        let query_text = query_text.to_string();
        self.executor
            .execute("concepts.search", &self.search, move || {
                let inner = Arc::clone(&inner);
                let query_vector = query_vector.clone();
                let query_text = query_text.clone();
                async move { inner.search(&query_vector, &query_text, limit).await }
            })
            .await
    }

    async fn find_related(&self, name: &str, limit: usize) -> Result<Vec<ConceptRow>> {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        self.executor
            .execute("concepts.find_related", &self.database, move || {
                let inner = Arc::clone(&inner);
                let name = name.clone();
                async move { inner.find_related(&name, limit).await }
            })
            .await
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>> {
        let inner = Arc::clone(&self.inner);
        let vector = vector.to_vec();
        self.executor
            .execute("concepts.vector_search", &self.search, move || {
                let inner = Arc::clone(&inner);
                let vector = vector.clone();
                async move { inner.vector_search(&vector, limit).await }
            })
            .await
    }
}

/// Category repository under the DATABASE profile
pub struct ResilientCategoryRepository {
    inner: Arc<dyn CategoryRepository>,
    executor: Arc<ResilientExecutor>,
    database: ResilienceProfile,
}

impl ResilientCategoryRepository {
    /// Wrap a repository
    pub fn new(
        inner: Arc<dyn CategoryRepository>,
        executor: Arc<ResilientExecutor>,
        database: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            database,
        }
    }
}

#[async_trait]
impl CategoryRepository for ResilientCategoryRepository {
    async fn upsert(&self, row: CategoryRow) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let row = Arc::new(row);
        self.executor
            .execute("categories.upsert", &self.database, move || {
                let inner = Arc::clone(&inner);
                let row = Arc::clone(&row);
                async move { inner.upsert(row.as_ref().clone()).await }
            })
            .await
    }

    async fn count(&self) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("categories.count", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.count().await }
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<CategoryRow>> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .execute("categories.find_all", &self.database, move || {
                let inner = Arc::clone(&inner);
                async move { inner.find_all().await }
            })
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRow>> {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        self.executor
            .execute("categories.find_by_name", &self.database, move || {
                let inner = Arc::clone(&inner);
                let name = name.clone();
                async move { inner.find_by_name(&name).await }
            })
            .await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CategoryRow>> {
        let inner = Arc::clone(&self.inner);
        let ids = ids.to_vec();
        self.executor
            .execute("categories.find_by_ids", &self.database, move || {
                let inner = Arc::clone(&inner);
                let ids = ids.clone();
                async move { inner.find_by_ids(&ids).await }
            })
            .await
    }
}

/// Embedding provider under the EMBEDDING profile
pub struct ResilientEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    executor: Arc<ResilientExecutor>,
    profile: ResilienceProfile,
}

impl ResilientEmbeddingProvider {
    /// Wrap a remote embedding provider
    pub fn new(
        inner: Arc<dyn EmbeddingProvider>,
        executor: Arc<ResilientExecutor>,
        profile: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            profile,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for ResilientEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.executor
            .execute("embedding.embed", &self.profile, move || {
                let inner = Arc::clone(&inner);
                let text = text.clone();
                async move { inner.embed(&text).await }
            })
            .await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let inner = Arc::clone(&self.inner);
        let texts = texts.to_vec();
        self.executor
            .execute("embedding.embed_batch", &self.profile, move || {
                let inner = Arc::clone(&inner);
                let texts = texts.clone();
                async move { inner.embed_batch(&texts).await }
            })
            .await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

/// Concept extractor under the LLM_API profile
///
/// `extract` propagates failures so the pipeline can record incomplete
/// coverage; `summarize` degrades to an empty summary, which the pipeline
/// replaces with the first chunk.
pub struct ResilientConceptExtractor {
    inner: Arc<dyn ConceptExtractor>,
    executor: Arc<ResilientExecutor>,
    profile: ResilienceProfile,
}

impl ResilientConceptExtractor {
    /// Wrap an extractor
    pub fn new(
        inner: Arc<dyn ConceptExtractor>,
        executor: Arc<ResilientExecutor>,
        profile: ResilienceProfile,
    ) -> Self {
        Self {
            inner,
            executor,
            profile,
        }
    }
}

#[async_trait]
impl ConceptExtractor for ResilientConceptExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedConcepts> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.executor
            .execute("llm.extract", &self.profile, move || {
                let inner = Arc::clone(&inner);
                let text = text.clone();
                async move { inner.extract(&text).await }
            })
            .await
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let executor = Arc::clone(&self.executor);
        let primary_executor = Arc::clone(&self.executor);
        let profile = self.profile.clone();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        GracefulDegradation::or_default(
            "llm.summarize",
            move || {
                executor.is_circuit_open("llm.summarize")
                    || executor.is_circuit_open("llm.extract")
            },
            move || async move {
                primary_executor
                    .execute("llm.summarize", &profile, move || {
                        let inner = Arc::clone(&inner);
                        let text = text.clone();
                        async move { inner.summarize(&text).await }
                    })
                    .await
            },
        )
        .await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
