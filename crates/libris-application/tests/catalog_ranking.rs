//! Catalog ranking over a seeded corpus
//!
//! Seeds the store directly (no pipeline) and checks the hybrid ranking
//! behavior the tool surface depends on.

use std::sync::Arc;

use async_trait::async_trait;

use libris_application::{HybridSearchService, QueryExpander};
use libris_domain::entities::{CatalogEntry, ConceptRow};
use libris_domain::error::Result;
use libris_domain::ids::{hash_to_id, normalize_concept};
use libris_domain::ports::{
    CatalogRepository, ChunkRepository, ConceptRepository, EmbeddingProvider, LexiconProvider,
};
use libris_domain::value_objects::SynsetEntry;
use libris_providers::embedding::HashingEmbedder;
use libris_providers::repository::{
    CatalogRepositoryImpl, ChunkRepositoryImpl, ConceptRepositoryImpl,
};
use libris_providers::store::{MemoryTableStore, TableStore};

struct EmptyLexicon;

#[async_trait]
impl LexiconProvider for EmptyLexicon {
    async fn lookup(&self, _term: &str) -> Result<Vec<SynsetEntry>> {
        Ok(Vec::new())
    }

    async fn store(&self, _term: &str, _senses: Vec<SynsetEntry>) -> Result<()> {
        Ok(())
    }
}

async fn entry(embedder: &dyn EmbeddingProvider, filename: &str, summary: &str) -> CatalogEntry {
    CatalogEntry {
        id: hash_to_id(filename),
        filename: filename.to_string(),
        hash: format!("hash-{}", filename),
        text: summary.to_string(),
        vector: embedder.embed(summary).await.unwrap().vector,
        category_ids: vec![],
        title: String::new(),
        author: String::new(),
        year: String::new(),
        publisher: String::new(),
        isbn: String::new(),
    }
}

async fn concept(embedder: &dyn EmbeddingProvider, name: &str, docs: &[&str]) -> ConceptRow {
    ConceptRow {
        id: hash_to_id(&normalize_concept(name)),
        concept: name.to_string(),
        catalog_ids: docs.iter().map(|d| hash_to_id(d)).collect(),
        related_concept_ids: vec![],
        synonyms: vec![],
        broader_terms: vec![],
        narrower_terms: vec![],
        weight: docs.len() as i32,
        vector: embedder.embed(name).await.unwrap().vector,
    }
}

async fn seeded_service() -> HybridSearchService {
    let store: Arc<dyn TableStore> = Arc::new(MemoryTableStore::new());
    let catalog: Arc<dyn CatalogRepository> =
        Arc::new(CatalogRepositoryImpl::new(Arc::clone(&store)));
    let chunks: Arc<dyn ChunkRepository> = Arc::new(ChunkRepositoryImpl::new(Arc::clone(&store)));
    let concepts: Arc<dyn ConceptRepository> =
        Arc::new(ConceptRepositoryImpl::new(Arc::clone(&store)));
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbedder::default());

    catalog
        .bulk_insert(vec![
            entry(
                embedder.as_ref(),
                "functional-programming.md",
                "functional programming in typescript",
            )
            .await,
            entry(
                embedder.as_ref(),
                "oo-design.md",
                "object-oriented design patterns",
            )
            .await,
            entry(
                embedder.as_ref(),
                "db-internals.md",
                "database internals",
            )
            .await,
        ])
        .await
        .unwrap();

    concepts
        .bulk_insert(vec![
            concept(
                embedder.as_ref(),
                "functional programming",
                &["functional-programming.md"],
            )
            .await,
            concept(embedder.as_ref(), "typescript", &["functional-programming.md"]).await,
            concept(embedder.as_ref(), "database indexing", &["db-internals.md"]).await,
        ])
        .await
        .unwrap();

    let expander = Arc::new(QueryExpander::new(
        Arc::clone(&concepts),
        Arc::new(EmptyLexicon),
        Arc::clone(&embedder),
    ));
    HybridSearchService::new(catalog, chunks, concepts, embedder, expander)
}

#[tokio::test]
async fn fp_query_ranks_the_functional_programming_document_first() {
    let service = seeded_service().await;
    let results = service.search_catalog("FP types", 3, true).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].row.filename, "functional-programming.md");

    let breakdown = results[0].breakdown.unwrap();
    assert!(breakdown.vector_score > 0.0);
    // "types" is a substring of the summary token "typescript".
    assert!(breakdown.bm25_score > 0.0);
    // No filename contains a query term.
    assert_eq!(breakdown.title_score, 0.0);
    assert!((0.0..=1.0).contains(&results[0].hybrid_score));
    assert!(results[0].hybrid_score > results[1].hybrid_score);

    // Debug output carries the expanded terms.
    assert!(!results[0].expanded_terms.is_empty());
}

#[tokio::test]
async fn ranking_is_deterministic() {
    let service = seeded_service().await;
    let first = service.search_catalog("design patterns", 3, false).await.unwrap();
    let second = service.search_catalog("design patterns", 3, false).await.unwrap();
    let names =
        |results: &[libris_domain::value_objects::RankedResult<CatalogEntry>]| -> Vec<String> {
            results.iter().map(|r| r.row.filename.clone()).collect()
        };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first[0].row.filename, "oo-design.md");
}

#[tokio::test]
async fn limit_truncates_after_ranking() {
    let service = seeded_service().await;
    let results = service.search_catalog("database internals", 1, false).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].row.filename, "db-internals.md");
}
