//! Chunk-level search
//!
//! Two retrieval shapes: corpus-wide passage search (vector candidates from
//! the chunk table) and within-document search (the document's chunks ranked
//! by the same hybrid scoring). Results carry the owning filename resolved
//! from the catalog.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use libris_domain::entities::ChunkRow;
use libris_domain::error::Result;
use libris_domain::ports::{CatalogRepository, ChunkRepository};
use libris_domain::value_objects::RankedResult;
use serde::{Deserialize, Serialize};

use super::hybrid::HybridSearchService;

/// Chunks fetched from a document before ranking
const WITHIN_SOURCE_SCAN: usize = 500;

/// A ranked chunk with its owning filename
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHit {
    /// The ranked chunk
    #[serde(flatten)]
    pub result: RankedResult<ChunkRow>,
    /// Owning document filename, empty when the catalog row is missing
    pub source: String,
}

/// Chunk-level search service
pub struct ChunkSearchService {
    hybrid: Arc<HybridSearchService>,
    chunks: Arc<dyn ChunkRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ChunkSearchService {
    /// Create the service with its dependencies
    pub fn new(
        hybrid: Arc<HybridSearchService>,
        chunks: Arc<dyn ChunkRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            hybrid,
            chunks,
            catalog,
        }
    }

    /// Hybrid search over chunks across the whole corpus
    pub async fn broad_search(
        &self,
        text: &str,
        limit: usize,
        debug_output: bool,
    ) -> Result<Vec<ChunkHit>> {
        let ranked = self.hybrid.search_chunks(text, limit, debug_output).await?;
        self.attach_sources(ranked).await
    }

    /// Hybrid-ranked chunks within one document
    ///
    /// Returns `None` when the source filename has no chunks (unknown
    /// document), distinguishing it from a document where nothing ranked.
    pub async fn search_within(
        &self,
        text: &str,
        source: &str,
        limit: usize,
    ) -> Result<Option<Vec<ChunkHit>>> {
        let rows = self
            .chunks
            .find_by_source(source, WITHIN_SOURCE_SCAN)
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let ranked = self.hybrid.rank_chunk_set(text, rows, limit, false).await?;
        Ok(Some(self.attach_sources(ranked).await?))
    }

    async fn attach_sources(&self, ranked: Vec<RankedResult<ChunkRow>>) -> Result<Vec<ChunkHit>> {
        let mut seen = HashSet::new();
        let catalog_ids: Vec<i32> = ranked
            .iter()
            .map(|r| r.row.catalog_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let filenames: HashMap<i32, String> = self
            .catalog
            .find_by_ids(&catalog_ids)
            .await?
            .into_iter()
            .map(|entry| (entry.id, entry.filename))
            .collect();

        Ok(ranked
            .into_iter()
            .map(|result| {
                let source = filenames
                    .get(&result.row.catalog_id)
                    .cloned()
                    .unwrap_or_default();
                ChunkHit { result, source }
            })
            .collect())
    }
}
