//! Application container
//!
//! The single composition root: resolves providers from configuration,
//! wraps them with the resilience layer, and wires the service graph. Every
//! service receives its dependencies here by constructor; nothing else in
//! the system constructs providers or holds module-level state.

use std::sync::Arc;

use tracing::info;

use libris_application::{
    CatalogSearchService, CategorySearchService, ChunkSearchService, ChunkerConfig,
    ConceptSearchService, HybridSearchService, IngestionPipeline, QueryExpander,
};
use libris_domain::error::Result;
use libris_domain::ports::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptExtractor, ConceptRepository,
    DocumentLoader, EmbeddingProvider, LexiconProvider,
};
use libris_providers::embedding::{HashingEmbedder, OpenAiEmbedder, OpenAiEmbedderConfig};
use libris_providers::extraction::{LlmConceptExtractor, LlmExtractorConfig, NullConceptExtractor};
use libris_providers::lexicon::FileLexicon;
use libris_providers::loader::{DocumentLoaderSet, TextDocumentLoader};
use libris_providers::repository::{
    CatalogRepositoryImpl, CategoryRepositoryImpl, ChunkRepositoryImpl, ConceptRepositoryImpl,
};
use libris_providers::store::{FilesystemTableStore, MemoryTableStore, TableStore};

use crate::config::{AppConfig, EmbeddingProviderKind, StoreBackend};
use crate::resilience::{
    HealthSummary, ResilientCatalogRepository, ResilientCategoryRepository,
    ResilientChunkRepository, ResilientConceptExtractor, ResilientConceptRepository,
    ResilientEmbeddingProvider, ResilientExecutor,
};

/// The wired object graph
pub struct AppContainer {
    /// Effective configuration
    pub config: AppConfig,
    /// Shared resilience state
    pub executor: Arc<ResilientExecutor>,
    /// The table store behind the repositories
    pub store: Arc<dyn TableStore>,
    /// Embedding provider (resilience-wrapped when remote)
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Catalog repository under the resilience layer
    pub catalog: Arc<dyn CatalogRepository>,
    /// Chunk repository under the resilience layer
    pub chunks: Arc<dyn ChunkRepository>,
    /// Concept repository under the resilience layer
    pub concepts: Arc<dyn ConceptRepository>,
    /// Category repository under the resilience layer
    pub categories: Arc<dyn CategoryRepository>,
    /// Document-level search service
    pub catalog_search: Arc<CatalogSearchService>,
    /// Chunk-level search service
    pub chunk_search: Arc<ChunkSearchService>,
    /// Concept-centric search service
    pub concept_search: Arc<ConceptSearchService>,
    /// Category service
    pub category_search: Arc<CategorySearchService>,
    /// Ingestion pipeline
    pub pipeline: Arc<IngestionPipeline>,
}

impl AppContainer {
    /// Build the container from configuration
    pub async fn build(config: AppConfig) -> Result<Arc<Self>> {
        let executor = Arc::new(ResilientExecutor::new());
        let database = config.resilience.database_profile();
        let search = config.resilience.search_profile();

        let store: Arc<dyn TableStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryTableStore::new()),
            StoreBackend::Filesystem => {
                Arc::new(FilesystemTableStore::open(&config.store.root).await?)
            }
        };

        let catalog: Arc<dyn CatalogRepository> = Arc::new(ResilientCatalogRepository::new(
            Arc::new(CatalogRepositoryImpl::new(Arc::clone(&store))),
            Arc::clone(&executor),
            database.clone(),
            search.clone(),
        ));
        let chunks: Arc<dyn ChunkRepository> = Arc::new(ResilientChunkRepository::new(
            Arc::new(ChunkRepositoryImpl::new(Arc::clone(&store))),
            Arc::clone(&executor),
            database.clone(),
            search.clone(),
        ));
        let concepts: Arc<dyn ConceptRepository> = Arc::new(ResilientConceptRepository::new(
            Arc::new(ConceptRepositoryImpl::new(Arc::clone(&store))),
            Arc::clone(&executor),
            database.clone(),
            search.clone(),
        ));
        let categories: Arc<dyn CategoryRepository> = Arc::new(ResilientCategoryRepository::new(
            Arc::new(CategoryRepositoryImpl::new(Arc::clone(&store))),
            Arc::clone(&executor),
            database,
        ));

        let embedder = Self::build_embedder(&config, &executor)?;
        let extractor = Self::build_extractor(&config, &executor)?;
        let lexicon: Arc<dyn LexiconProvider> =
            Arc::new(FileLexicon::new(&config.lexicon.cache_path));
        let loader: Arc<dyn DocumentLoader> = Arc::new(DocumentLoaderSet::new(vec![Arc::new(
            TextDocumentLoader::new(),
        )]));

        let expander = Arc::new(QueryExpander::new(
            Arc::clone(&concepts),
            Arc::clone(&lexicon),
            Arc::clone(&embedder),
        ));
        let hybrid = Arc::new(HybridSearchService::new(
            Arc::clone(&catalog),
            Arc::clone(&chunks),
            Arc::clone(&concepts),
            Arc::clone(&embedder),
            expander,
        ));

        let catalog_search = Arc::new(CatalogSearchService::new(
            Arc::clone(&hybrid),
            Arc::clone(&catalog),
            Arc::clone(&chunks),
            Arc::clone(&concepts),
            Arc::clone(&categories),
        ));
        let chunk_search = Arc::new(ChunkSearchService::new(
            Arc::clone(&hybrid),
            Arc::clone(&chunks),
            Arc::clone(&catalog),
        ));
        let concept_search = Arc::new(ConceptSearchService::new(
            Arc::clone(&concepts),
            Arc::clone(&chunks),
            Arc::clone(&catalog),
        ));
        let category_search = Arc::new(CategorySearchService::new(
            Arc::clone(&categories),
            Arc::clone(&catalog),
            Arc::clone(&concepts),
        ));

        let pipeline = Arc::new(IngestionPipeline::new(
            loader,
            Arc::clone(&embedder),
            extractor,
            Arc::clone(&lexicon),
            Arc::clone(&catalog),
            Arc::clone(&chunks),
            Arc::clone(&concepts),
            Arc::clone(&categories),
            ChunkerConfig {
                min_chars: config.chunking.min_chars,
                max_chars: config.chunking.max_chars,
            },
        ));

        info!(
            store = store.provider_name(),
            embedder = embedder.provider_name(),
            dimensions = embedder.dimensions(),
            "application container built"
        );

        Ok(Arc::new(Self {
            config,
            executor,
            store,
            embedder,
            catalog,
            chunks,
            concepts,
            categories,
            catalog_search,
            chunk_search,
            concept_search,
            category_search,
            pipeline,
        }))
    }

    fn build_embedder(
        config: &AppConfig,
        executor: &Arc<ResilientExecutor>,
    ) -> Result<Arc<dyn EmbeddingProvider>> {
        match config.embedding.provider {
            EmbeddingProviderKind::Hashing => {
                Ok(Arc::new(HashingEmbedder::new(config.embedding.dimensions)))
            }
            EmbeddingProviderKind::OpenAi => {
                let remote = OpenAiEmbedder::new(OpenAiEmbedderConfig {
                    base_url: config.embedding.base_url.clone(),
                    api_key: config.embedding.api_key.clone(),
                    model: config.embedding.model.clone(),
                    dimensions: config.embedding.dimensions,
                    timeout: std::time::Duration::from_secs(config.embedding.timeout_secs),
                })?;
                Ok(Arc::new(ResilientEmbeddingProvider::new(
                    Arc::new(remote),
                    Arc::clone(executor),
                    config.resilience.embedding_profile(),
                )))
            }
        }
    }

    fn build_extractor(
        config: &AppConfig,
        executor: &Arc<ResilientExecutor>,
    ) -> Result<Arc<dyn ConceptExtractor>> {
        if config.llm.base_url.is_empty() {
            info!("no LLM endpoint configured; concept extraction disabled");
            return Ok(Arc::new(NullConceptExtractor::new()));
        }
        let remote = LlmConceptExtractor::new(LlmExtractorConfig {
            base_url: config.llm.base_url.clone(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            timeout: std::time::Duration::from_secs(config.llm.timeout_secs),
        })?;
        Ok(Arc::new(ResilientConceptExtractor::new(
            Arc::new(remote),
            Arc::clone(executor),
            config.resilience.llm_api_profile(),
        )))
    }

    /// Aggregated resilience health
    pub fn health(&self) -> HealthSummary {
        self.executor.health_summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    #[tokio::test]
    async fn builds_with_memory_store_and_hashing_embedder() {
        let config = AppConfig {
            store: StoreConfig {
                backend: StoreBackend::Memory,
                ..Default::default()
            },
            ..Default::default()
        };
        let container = AppContainer::build(config).await.unwrap();
        assert_eq!(container.store.provider_name(), "memory");
        assert_eq!(container.embedder.provider_name(), "hashing");
        assert_eq!(container.embedder.dimensions(), 384);
        assert!(container.health().healthy);
    }
}
