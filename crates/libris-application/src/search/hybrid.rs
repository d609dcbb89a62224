//! Five-signal hybrid ranking
//!
//! Re-ranks vector-search candidates with a fixed blend of vector
//! similarity, weighted BM25, title match, corpus-concept overlap and
//! lexical-ontology overlap. The query expansion drives every non-vector
//! signal. Sub-score computation is pure; a candidate that cannot be scored
//! on one signal takes 0.0 for that signal and stays in the ranking.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use libris_domain::entities::{CatalogEntry, ChunkRow};
use libris_domain::error::Result;
use libris_domain::ports::{
    CatalogRepository, ChunkRepository, ConceptRepository, EmbeddingProvider,
};
use libris_domain::value_objects::{ExpandedQuery, RankedResult, ScoreBreakdown};
use tracing::debug;

use super::bm25;
use crate::query::QueryExpander;

/// Weight of the vector similarity signal
pub const VECTOR_WEIGHT: f32 = 0.25;
/// Weight of the BM25 signal
pub const BM25_WEIGHT: f32 = 0.25;
/// Weight of the title (source name) signal
pub const TITLE_WEIGHT: f32 = 0.20;
/// Weight of the corpus-concept overlap signal
pub const CONCEPT_WEIGHT: f32 = 0.20;
/// Weight of the lexical-ontology overlap signal
pub const WORDNET_WEIGHT: f32 = 0.10;

/// Candidate pool multiplier applied to the requested limit
const CANDIDATE_FACTOR: usize = 3;
/// Expanded terms attached to debug responses
const DEBUG_TERM_SAMPLE: usize = 10;

/// Hybrid search over the catalog and chunk tables
pub struct HybridSearchService {
    catalog: Arc<dyn CatalogRepository>,
    chunks: Arc<dyn ChunkRepository>,
    concepts: Arc<dyn ConceptRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    expander: Arc<QueryExpander>,
}

/// Scoring inputs shared by catalog and chunk candidates
struct Candidate {
    id: i32,
    distance: f32,
    body: String,
    source: String,
    concept_names: Vec<String>,
}

struct Scored {
    hybrid: f32,
    breakdown: ScoreBreakdown,
    matched_concepts: Vec<String>,
}

impl HybridSearchService {
    /// Create the service with its repository and provider dependencies
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        chunks: Arc<dyn ChunkRepository>,
        concepts: Arc<dyn ConceptRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        expander: Arc<QueryExpander>,
    ) -> Self {
        Self {
            catalog,
            chunks,
            concepts,
            embedder,
            expander,
        }
    }

    /// Rank catalog rows against a query
    pub async fn search_catalog(
        &self,
        query: &str,
        limit: usize,
        debug_output: bool,
    ) -> Result<Vec<RankedResult<CatalogEntry>>> {
        let expanded = self.expander.expand(query).await;
        let qvec = self.embedder.embed(query).await?;
        let hits = self
            .catalog
            .vector_search(&qvec.vector, limit * CANDIDATE_FACTOR)
            .await?;
        debug!(
            candidates = hits.len(),
            terms = expanded.all_terms.len(),
            "catalog search candidates"
        );

        let mut rows = Vec::with_capacity(hits.len());
        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            candidates.push(Candidate {
                id: hit.row.id,
                distance: hit.distance,
                body: hit.row.text.clone(),
                source: hit.row.filename.clone(),
                // Catalog rows carry no concept references; the concept
                // signal degrades to zero at the document level.
                concept_names: Vec::new(),
            });
            rows.push(hit.row);
        }

        Ok(self.rank(rows, candidates, &expanded, limit, debug_output))
    }

    /// Rank chunks across the whole corpus against a query
    pub async fn search_chunks(
        &self,
        query: &str,
        limit: usize,
        debug_output: bool,
    ) -> Result<Vec<RankedResult<ChunkRow>>> {
        let expanded = self.expander.expand(query).await;
        let qvec = self.embedder.embed(query).await?;
        let hits = self
            .chunks
            .vector_search(&qvec.vector, limit * CANDIDATE_FACTOR)
            .await?;

        let rows: Vec<ChunkRow> = hits.iter().map(|h| h.row.clone()).collect();
        let distances: Vec<f32> = hits.iter().map(|h| h.distance).collect();
        let candidates = self.chunk_candidates(&rows, &distances).await;

        Ok(self.rank(rows, candidates, &expanded, limit, debug_output))
    }

    /// Rank an already-selected set of chunks (within-document search)
    ///
    /// Distances are computed locally against the query embedding since the
    /// set was chosen by an indexed predicate rather than a vector search.
    pub async fn rank_chunk_set(
        &self,
        query: &str,
        rows: Vec<ChunkRow>,
        limit: usize,
        debug_output: bool,
    ) -> Result<Vec<RankedResult<ChunkRow>>> {
        let expanded = self.expander.expand(query).await;
        let qvec = self.embedder.embed(query).await?;
        let distances: Vec<f32> = rows
            .iter()
            .map(|row| 1.0 - normalized_cosine(&qvec.vector, &row.vector))
            .collect();
        let candidates = self.chunk_candidates(&rows, &distances).await;

        Ok(self.rank(rows, candidates, &expanded, limit, debug_output))
    }

    /// Resolve chunk scoring metadata: owning filenames and concept names
    ///
    /// Lookup failures leave the affected fields empty; the candidates still
    /// participate in ranking with degraded signals.
    async fn chunk_candidates(&self, rows: &[ChunkRow], distances: &[f32]) -> Vec<Candidate> {
        let catalog_ids: Vec<i32> = {
            let mut seen = HashSet::new();
            rows.iter()
                .map(|r| r.catalog_id)
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let filenames: HashMap<i32, String> = match self.catalog.find_by_ids(&catalog_ids).await {
            Ok(entries) => entries.into_iter().map(|e| (e.id, e.filename)).collect(),
            Err(err) => {
                debug!(error = %err, "failed to resolve chunk sources");
                HashMap::new()
            }
        };

        let concept_ids: Vec<i32> = {
            let mut seen = HashSet::new();
            rows.iter()
                .flat_map(|r| r.concept_ids.iter().copied())
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let concept_names: HashMap<i32, String> =
            match self.concepts.find_by_ids(&concept_ids).await {
                Ok(found) => found.into_iter().map(|c| (c.id, c.concept)).collect(),
                Err(err) => {
                    debug!(error = %err, "failed to resolve chunk concepts");
                    HashMap::new()
                }
            };

        rows.iter()
            .zip(distances.iter())
            .map(|(row, distance)| Candidate {
                id: row.id,
                distance: *distance,
                body: row.text.clone(),
                source: filenames.get(&row.catalog_id).cloned().unwrap_or_default(),
                concept_names: row
                    .concept_ids
                    .iter()
                    .filter_map(|id| concept_names.get(id).cloned())
                    .collect(),
            })
            .collect()
    }

    /// Score, sort and truncate candidates
    ///
    /// Sorted by hybrid score descending, tie-broken by ascending distance
    /// and finally ascending row id so equal-scoring candidates rank
    /// deterministically across processes.
    fn rank<T>(
        &self,
        rows: Vec<T>,
        candidates: Vec<Candidate>,
        expanded: &ExpandedQuery,
        limit: usize,
        debug_output: bool,
    ) -> Vec<RankedResult<T>> {
        let mut ranked: Vec<(i32, RankedResult<T>)> = rows
            .into_iter()
            .zip(candidates)
            .map(|(row, candidate)| {
                let scored = score_candidate(&candidate, expanded);
                let result = RankedResult {
                    row,
                    distance: candidate.distance,
                    hybrid_score: scored.hybrid,
                    breakdown: debug_output.then_some(scored.breakdown),
                    matched_concepts: scored.matched_concepts,
                    expanded_terms: if debug_output {
                        expanded
                            .all_terms
                            .iter()
                            .take(DEBUG_TERM_SAMPLE)
                            .cloned()
                            .collect()
                    } else {
                        Vec::new()
                    },
                };
                (candidate.id, result)
            })
            .collect();

        ranked.sort_by(|(id_a, a), (id_b, b)| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(Ordering::Equal)
                .then(
                    a.distance
                        .partial_cmp(&b.distance)
                        .unwrap_or(Ordering::Equal),
                )
                .then(id_a.cmp(id_b))
        });
        ranked.truncate(limit);
        ranked.into_iter().map(|(_, result)| result).collect()
    }
}

/// Compute the five signals and the weighted hybrid score for one candidate
fn score_candidate(candidate: &Candidate, expanded: &ExpandedQuery) -> Scored {
    let vector_score = (1.0 - candidate.distance).clamp(0.0, 1.0);
    let bm25_score = bm25::score(&candidate.body, &candidate.source, expanded);
    let title_score = title_score(&candidate.source, expanded);
    let (concept_score, matched_concepts) = concept_score(&candidate.concept_names, expanded);
    let wordnet_score = wordnet_score(&candidate.body, expanded);

    let breakdown = ScoreBreakdown {
        vector_score,
        bm25_score,
        title_score,
        concept_score,
        wordnet_score,
    };
    let hybrid = VECTOR_WEIGHT * vector_score
        + BM25_WEIGHT * bm25_score
        + TITLE_WEIGHT * title_score
        + CONCEPT_WEIGHT * concept_score
        + WORDNET_WEIGHT * wordnet_score;

    Scored {
        hybrid: hybrid.clamp(0.0, 1.0),
        breakdown,
        matched_concepts,
    }
}

/// Fraction of original query terms appearing in the source name
fn title_score(source: &str, expanded: &ExpandedQuery) -> f32 {
    if expanded.original_terms.is_empty() || source.is_empty() {
        return 0.0;
    }
    let source_lower = source.to_lowercase();
    let matched = expanded
        .original_terms
        .iter()
        .filter(|term| source_lower.contains(term.as_str()))
        .count();
    (matched as f32 / expanded.original_terms.len() as f32).clamp(0.0, 1.0)
}

/// Weighted overlap between the candidate's concepts and the expanded terms
fn concept_score(concept_names: &[String], expanded: &ExpandedQuery) -> (f32, Vec<String>) {
    if concept_names.is_empty() || expanded.all_terms.is_empty() {
        return (0.0, Vec::new());
    }
    let mut total = 0.0;
    let mut matched = Vec::new();
    for name in concept_names {
        let name_lower = name.to_lowercase();
        let mut hit = false;
        for term in &expanded.all_terms {
            if name_lower.contains(term.as_str()) || term.contains(name_lower.as_str()) {
                total += expanded.weight(term);
                hit = true;
            }
        }
        if hit {
            matched.push(name.clone());
        }
    }
    (
        (total / expanded.all_terms.len() as f32).clamp(0.0, 1.0),
        matched,
    )
}

/// Fraction of lexical-expansion terms appearing in the candidate body
fn wordnet_score(body: &str, expanded: &ExpandedQuery) -> f32 {
    if expanded.lexical_terms.is_empty() {
        return 0.0;
    }
    let body_lower = body.to_lowercase();
    let matched = expanded
        .lexical_terms
        .iter()
        .filter(|term| body_lower.contains(term.as_str()))
        .count();
    (matched as f32 / expanded.lexical_terms.len() as f32).clamp(0.0, 1.0)
}

/// Similarity in `[0, 1]`: shifted cosine, matching the store's metric
fn normalized_cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let sum = VECTOR_WEIGHT + BM25_WEIGHT + TITLE_WEIGHT + CONCEPT_WEIGHT + WORDNET_WEIGHT;
        assert!((sum - 1.0).abs() < f32::EPSILON);
    }

    fn expanded_with(original: &[&str], lexical: &[&str]) -> ExpandedQuery {
        let mut q = ExpandedQuery::default();
        for term in original {
            q.original_terms.push((*term).to_string());
            q.merge_term(term, 1.0);
        }
        for term in lexical {
            q.lexical_terms.push((*term).to_string());
            q.merge_term(term, 0.6);
        }
        q
    }

    #[test]
    fn all_signals_stay_in_unit_interval() {
        let candidate = Candidate {
            id: 1,
            distance: 0.1,
            body: "the repository pattern isolates data access".to_string(),
            source: "patterns.pdf".to_string(),
            concept_names: vec!["repository pattern".to_string()],
        };
        let expanded = expanded_with(&["repository", "pattern"], &["storage"]);
        let scored = score_candidate(&candidate, &expanded);
        let b = scored.breakdown;
        for signal in [
            b.vector_score,
            b.bm25_score,
            b.title_score,
            b.concept_score,
            b.wordnet_score,
        ] {
            assert!((0.0..=1.0).contains(&signal), "signal out of range: {}", signal);
        }
        assert!((0.0..=1.0).contains(&scored.hybrid));
        assert_eq!(scored.matched_concepts, vec!["repository pattern"]);
    }

    #[test]
    fn title_score_counts_matched_fraction() {
        let expanded = expanded_with(&["database", "internals"], &[]);
        assert_eq!(title_score("database-systems.pdf", &expanded), 0.5);
        assert_eq!(title_score("poetry.epub", &expanded), 0.0);
        assert_eq!(title_score("", &expanded), 0.0);
    }

    #[test]
    fn concept_signal_degrades_to_zero_without_concepts() {
        let expanded = expanded_with(&["anything"], &[]);
        let (score, matched) = concept_score(&[], &expanded);
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn out_of_range_distance_clamps_vector_score() {
        let candidate = Candidate {
            id: 1,
            distance: 1.7,
            body: String::new(),
            source: String::new(),
            concept_names: Vec::new(),
        };
        let scored = score_candidate(&candidate, &ExpandedQuery::default());
        assert_eq!(scored.breakdown.vector_score, 0.0);
    }
}
