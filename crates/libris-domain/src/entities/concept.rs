//! Concept rows - the corpus concept vocabulary

use serde::{Deserialize, Serialize};

/// A canonical term extracted from one or more chunks
///
/// ## Invariants
///
/// - `id == hash_to_id(normalize_concept(concept))`
/// - `weight == catalog_ids.len()`
/// - every id in `catalog_ids` has at least one chunk referencing this
///   concept
///
/// Concepts are upserted during ingestion: `catalog_ids` is unioned with set
/// semantics and kept sorted, `weight` is recomputed. Concepts are never
/// deleted individually; a full rebuild re-derives them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConceptRow {
    /// Primary key, derived from the normalized concept string
    pub id: i32,
    /// Canonical display form
    pub concept: String,
    /// Documents mentioning this concept (sorted, set semantics)
    pub catalog_ids: Vec<i32>,
    /// Corpus co-occurrence neighbors, strongest first
    pub related_concept_ids: Vec<i32>,
    /// Lexical-ontology synonyms, may be empty
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Lexical-ontology broader terms, may be empty
    #[serde(default)]
    pub broader_terms: Vec<String>,
    /// Lexical-ontology narrower terms, may be empty
    #[serde(default)]
    pub narrower_terms: Vec<String>,
    /// Document frequency; cached `catalog_ids.len()`
    pub weight: i32,
    /// Embedding of the display form
    pub vector: Vec<f32>,
}
