//! Search-related value objects

use crate::entities::{ChunkRow, ConceptRow};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A raw vector-search hit: a row and its distance to the query vector
///
/// Distance is cosine distance (`1 - cosine_similarity`); results are sorted
/// ascending by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit<T> {
    /// The matched row
    pub row: T,
    /// Cosine distance to the query vector
    pub distance: f32,
}

/// Per-signal score breakdown attached to debug search responses
///
/// Every sub-score is clamped to `[0, 1]`; the hybrid score is the fixed
/// weighted sum of the five and therefore also in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `1 - distance`, clamped
    pub vector_score: f32,
    /// Weighted BM25 over body and source name
    pub bm25_score: f32,
    /// Fraction of original terms matching the source name
    pub title_score: f32,
    /// Expanded-term overlap with the row's concept names
    pub concept_score: f32,
    /// Fraction of lexical terms appearing in the body
    pub wordnet_score: f32,
}

/// A ranked search result with its hybrid score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult<T> {
    /// The ranked row
    pub row: T,
    /// Cosine distance from the initial vector search
    pub distance: f32,
    /// Weighted hybrid score in `[0, 1]`
    pub hybrid_score: f32,
    /// Per-signal breakdown, present when debug output was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    /// Concept names that contributed to the concept signal
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub matched_concepts: Vec<String>,
    /// First expanded terms, present when debug output was requested
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub expanded_terms: Vec<String>,
}

/// Sort order for concept search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptSortBy {
    /// Descending count of distinct concepts per chunk
    #[default]
    Density,
    /// Composite of normalized density, concept presence and chunk length
    Relevance,
    /// Ascending owning filename
    Source,
}

impl FromStr for ConceptSortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "density" => Ok(Self::Density),
            "relevance" => Ok(Self::Relevance),
            "source" => Ok(Self::Source),
            other => Err(format!(
                "unknown sort order '{}' (expected density, relevance or source)",
                other
            )),
        }
    }
}

/// Result of a concept-centric search
///
/// An unknown concept yields an empty outcome with `concept_metadata: None`;
/// it is a valid response, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptSearchOutcome {
    /// The concept as queried (display form preserved)
    pub concept: String,
    /// Matching chunks after filtering, sorting and truncation
    pub chunks: Vec<ChunkRow>,
    /// Names of related concepts, strongest co-occurrence first
    pub related_concepts: Vec<String>,
    /// Number of candidate chunks before truncation
    pub total_found: usize,
    /// The stored concept row, absent when the concept is unknown
    pub concept_metadata: Option<ConceptRow>,
}

impl ConceptSearchOutcome {
    /// Empty outcome for an unknown concept
    pub fn empty(concept: &str) -> Self {
        Self {
            concept: concept.to_string(),
            chunks: Vec::new(),
            related_concepts: Vec::new(),
            total_found: 0,
            concept_metadata: None,
        }
    }
}
