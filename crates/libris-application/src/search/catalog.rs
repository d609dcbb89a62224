//! Document-level search and concept derivation
//!
//! Orchestrates the catalog tools: hybrid document search, the stored-ID
//! concept report for one document, and per-document concept listings.

use std::collections::HashMap;
use std::sync::Arc;

use libris_domain::entities::{CatalogEntry, ConceptRow};
use libris_domain::error::Result;
use libris_domain::ports::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptRepository,
};
use libris_domain::value_objects::RankedResult;
use serde::{Deserialize, Serialize};

use super::hybrid::HybridSearchService;

/// Chunks examined when aggregating a document's concepts
const SOURCE_CHUNK_SCAN: usize = 1000;

/// Concepts and categories of one document, derived from stored IDs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptReport {
    /// Concept names mentioned by the document, most frequent first
    pub primary_concepts: Vec<String>,
    /// Category names the document is filed under
    pub categories: Vec<String>,
    /// Related concept names aggregated over the document's concepts
    pub related_concepts: Vec<String>,
}

/// Document-level search service
pub struct CatalogSearchService {
    hybrid: Arc<HybridSearchService>,
    catalog: Arc<dyn CatalogRepository>,
    chunks: Arc<dyn ChunkRepository>,
    concepts: Arc<dyn ConceptRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl CatalogSearchService {
    /// Create the service with its dependencies
    pub fn new(
        hybrid: Arc<HybridSearchService>,
        catalog: Arc<dyn CatalogRepository>,
        chunks: Arc<dyn ChunkRepository>,
        concepts: Arc<dyn ConceptRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            hybrid,
            catalog,
            chunks,
            concepts,
            categories,
        }
    }

    /// Hybrid search over catalog rows
    pub async fn search(
        &self,
        text: &str,
        limit: usize,
        debug_output: bool,
    ) -> Result<Vec<RankedResult<CatalogEntry>>> {
        self.hybrid.search_catalog(text, limit, debug_output).await
    }

    /// Concept report for one document, from stored cross-references only
    ///
    /// Returns `None` when the source filename is unknown.
    pub async fn extract_concepts(&self, source: &str) -> Result<Option<ConceptReport>> {
        let Some(entry) = self.catalog.find_by_source(source).await? else {
            return Ok(None);
        };

        let concept_rows = self.concepts_of(entry.id, usize::MAX).await?;
        let primary_concepts: Vec<String> =
            concept_rows.iter().map(|c| c.concept.clone()).collect();

        let mut related_ids: Vec<i32> = Vec::new();
        for row in &concept_rows {
            for id in &row.related_concept_ids {
                if !related_ids.contains(id) && !concept_rows.iter().any(|c| c.id == *id) {
                    related_ids.push(*id);
                }
            }
        }
        let related_concepts = self
            .concepts
            .find_by_ids(&related_ids)
            .await?
            .into_iter()
            .map(|c| c.concept)
            .collect();

        let categories = self
            .categories
            .find_by_ids(&entry.category_ids)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        Ok(Some(ConceptReport {
            primary_concepts,
            categories,
            related_concepts,
        }))
    }

    /// Concepts of one document, most frequently mentioned first
    ///
    /// Returns `None` when the source filename is unknown.
    pub async fn source_concepts(
        &self,
        source: &str,
        limit: usize,
    ) -> Result<Option<Vec<ConceptRow>>> {
        let Some(entry) = self.catalog.find_by_source(source).await? else {
            return Ok(None);
        };
        Ok(Some(self.concepts_of(entry.id, limit).await?))
    }

    /// Aggregate a document's concepts over its chunks' `concept_ids`
    async fn concepts_of(&self, catalog_id: i32, limit: usize) -> Result<Vec<ConceptRow>> {
        let chunks = self
            .chunks
            .find_by_catalog_id(catalog_id, SOURCE_CHUNK_SCAN)
            .await?;

        let mut frequency: HashMap<i32, usize> = HashMap::new();
        for chunk in &chunks {
            for id in &chunk.concept_ids {
                *frequency.entry(*id).or_insert(0) += 1;
            }
        }
        let mut ordered: Vec<(i32, usize)> = frequency.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let ids: Vec<i32> = ordered.into_iter().take(limit).map(|(id, _)| id).collect();

        let rows = self.concepts.find_by_ids(&ids).await?;
        // find_by_ids preserves no particular order; restore frequency order.
        let index: HashMap<i32, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut rows = rows;
        rows.sort_by_key(|row| index.get(&row.id).copied().unwrap_or(usize::MAX));
        Ok(rows)
    }
}
