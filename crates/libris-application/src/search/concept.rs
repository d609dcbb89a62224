//! Concept-centric search
//!
//! Resolves a concept name to its stored row, gathers the chunks that
//! mention the concept across the concept's documents, and ranks them by
//! density, relevance or source. An unknown concept is a valid empty
//! outcome, never an error.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use libris_domain::entities::ChunkRow;
use libris_domain::error::Result;
use libris_domain::ids::normalize_concept;
use libris_domain::ports::{CatalogRepository, ChunkRepository, ConceptRepository};
use libris_domain::value_objects::{ConceptSearchOutcome, ConceptSortBy};
use tracing::debug;

/// Related concept names attached to an outcome
const RELATED_LIMIT: usize = 10;
/// Characters per density unit in the relevance formula
const DENSITY_UNIT_CHARS: f32 = 500.0;
/// Body length granting the substance bonus in the relevance formula
const SUBSTANTIAL_CHUNK_CHARS: usize = 300;

/// Concept search and concept-to-document resolution
pub struct ConceptSearchService {
    concepts: Arc<dyn ConceptRepository>,
    chunks: Arc<dyn ChunkRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ConceptSearchService {
    /// Create the service with its repository dependencies
    pub fn new(
        concepts: Arc<dyn ConceptRepository>,
        chunks: Arc<dyn ChunkRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            concepts,
            chunks,
            catalog,
        }
    }

    /// Find the chunks where a concept appears
    ///
    /// `source_filter` is a case-insensitive substring over the owning
    /// filename. `total_found` counts candidates after filtering but before
    /// truncation to `limit`.
    pub async fn search(
        &self,
        concept: &str,
        limit: usize,
        source_filter: Option<&str>,
        sort_by: ConceptSortBy,
    ) -> Result<ConceptSearchOutcome> {
        let display_name = concept.trim();
        let lookup = normalize_concept(display_name);

        let Some(row) = self.concepts.find_by_name(&lookup).await? else {
            debug!(concept = %display_name, "concept not found");
            return Ok(ConceptSearchOutcome::empty(display_name));
        };

        let related_ids: Vec<i32> = row
            .related_concept_ids
            .iter()
            .take(RELATED_LIMIT)
            .copied()
            .collect();
        let related_concepts = self
            .concepts
            .find_by_ids(&related_ids)
            .await?
            .into_iter()
            .map(|c| c.concept)
            .collect();

        let candidates = self
            .chunks
            .find_by_concept_name(&lookup, limit.saturating_mul(2))
            .await?;
        let filenames = self.owning_filenames(&candidates).await?;

        let mut kept: Vec<ChunkRow> = match source_filter {
            Some(filter) if !filter.trim().is_empty() => {
                let needle = filter.trim().to_lowercase();
                candidates
                    .into_iter()
                    .filter(|chunk| {
                        filenames
                            .get(&chunk.catalog_id)
                            .is_some_and(|name| name.to_lowercase().contains(&needle))
                    })
                    .collect()
            }
            _ => candidates,
        };
        let total_found = kept.len();

        sort_chunks(&mut kept, sort_by, &filenames);
        kept.truncate(limit);

        Ok(ConceptSearchOutcome {
            concept: display_name.to_string(),
            chunks: kept,
            related_concepts,
            total_found,
            concept_metadata: Some(row),
        })
    }

    /// Documents mentioning a concept, via the concept's `catalog_ids`
    pub async fn sources(
        &self,
        concept: &str,
        limit: usize,
    ) -> Result<Vec<libris_domain::entities::CatalogEntry>> {
        let lookup = normalize_concept(concept.trim());
        let Some(row) = self.concepts.find_by_name(&lookup).await? else {
            return Ok(Vec::new());
        };
        let ids: Vec<i32> = row.catalog_ids.iter().take(limit).copied().collect();
        self.catalog.find_by_ids(&ids).await
    }

    /// Map owning catalog ids to filenames for a chunk set
    async fn owning_filenames(&self, chunks: &[ChunkRow]) -> Result<HashMap<i32, String>> {
        let mut seen = HashSet::new();
        let ids: Vec<i32> = chunks
            .iter()
            .map(|c| c.catalog_id)
            .filter(|id| seen.insert(*id))
            .collect();
        Ok(self
            .catalog
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|entry| (entry.id, entry.filename))
            .collect())
    }
}

/// Sort chunks per the requested order, with id as the final tie-break
fn sort_chunks(chunks: &mut [ChunkRow], sort_by: ConceptSortBy, filenames: &HashMap<i32, String>) {
    match sort_by {
        ConceptSortBy::Density => {
            chunks.sort_by(|a, b| {
                distinct_concepts(b)
                    .cmp(&distinct_concepts(a))
                    .then(a.id.cmp(&b.id))
            });
        }
        ConceptSortBy::Relevance => {
            chunks.sort_by(|a, b| {
                relevance(b)
                    .partial_cmp(&relevance(a))
                    .unwrap_or(Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            });
        }
        ConceptSortBy::Source => {
            chunks.sort_by(|a, b| {
                let name_a = filenames.get(&a.catalog_id).map(String::as_str).unwrap_or("");
                let name_b = filenames.get(&b.catalog_id).map(String::as_str).unwrap_or("");
                name_a.cmp(name_b).then(a.id.cmp(&b.id))
            });
        }
    }
}

fn distinct_concepts(chunk: &ChunkRow) -> usize {
    chunk.concept_ids.iter().collect::<HashSet<_>>().len()
}

/// Relevance: normalized concept density, concept presence and body length
fn relevance(chunk: &ChunkRow) -> f32 {
    let density_units = (chunk.text.len() as f32 / DENSITY_UNIT_CHARS).max(f32::EPSILON);
    let normalized_density = (chunk.concept_ids.len() as f32 / density_units).min(1.0);
    // Candidates are selected by concept membership, so the presence factor
    // is constant here; it matters when the formula is reused on mixed sets.
    let presence = if chunk.concept_ids.is_empty() { 0.0 } else { 1.0 };
    let substance = if chunk.text.len() >= SUBSTANTIAL_CHUNK_CHARS {
        1.0
    } else {
        0.0
    };
    0.5 * normalized_density + 0.3 * presence + 0.2 * substance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: i32, catalog_id: i32, text_len: usize, concepts: &[i32]) -> ChunkRow {
        ChunkRow {
            id,
            catalog_id,
            hash: "h".to_string(),
            text: "x".repeat(text_len),
            vector: vec![0.0],
            concept_ids: concepts.to_vec(),
            category_ids: vec![],
            loc: String::new(),
        }
    }

    #[test]
    fn density_sort_prefers_concept_rich_chunks() {
        let mut chunks = vec![
            chunk(1, 10, 400, &[1]),
            chunk(2, 10, 400, &[1, 2, 3]),
            chunk(3, 10, 400, &[1, 2]),
        ];
        sort_chunks(&mut chunks, ConceptSortBy::Density, &HashMap::new());
        let ids: Vec<i32> = chunks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn source_sort_orders_by_filename_then_id() {
        let filenames: HashMap<i32, String> = [
            (10, "zebra.pdf".to_string()),
            (20, "aardvark.pdf".to_string()),
        ]
        .into_iter()
        .collect();
        let mut chunks = vec![chunk(1, 10, 100, &[1]), chunk(2, 20, 100, &[1])];
        sort_chunks(&mut chunks, ConceptSortBy::Source, &filenames);
        let ids: Vec<i32> = chunks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn relevance_rewards_substantial_dense_chunks() {
        let dense = relevance(&chunk(1, 10, 500, &[1, 2, 3]));
        let sparse = relevance(&chunk(2, 10, 2000, &[1]));
        assert!(dense > sparse);
        assert!((0.0..=1.0).contains(&dense));
    }
}
