//! Expanded query value object

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A weighted multiset of query terms
///
/// Produced by the query expander from the raw query string. Original terms
/// carry weight 1.0 and dominate; corpus-concept and lexical expansions carry
/// reduced weights. `weights` maps every term in `all_terms` to its final
/// (max-merged) weight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpandedQuery {
    /// Tokens of the raw query (lowercased, punctuation stripped, len > 2)
    pub original_terms: Vec<String>,
    /// Terms contributed by nearest corpus concepts
    pub corpus_terms: Vec<String>,
    /// Terms contributed by lexical-ontology expansion
    pub lexical_terms: Vec<String>,
    /// Union of the three sources, original terms first
    pub all_terms: Vec<String>,
    /// Final weight per term (max over contributing sources)
    pub weights: HashMap<String, f32>,
}

impl ExpandedQuery {
    /// Weight of a term, 0.0 when the term is not part of the expansion
    pub fn weight(&self, term: &str) -> f32 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Merge a term contribution, keeping the maximum weight per term
    ///
    /// An equal weight keeps the earlier contribution, so callers merge
    /// sources in dominance order: original terms first, then corpus
    /// concepts, then lexical expansions. Original terms always dominate and
    /// corpus contributions win ties against lexical ones.
    pub fn merge_term(&mut self, term: &str, weight: f32) {
        let entry = self.weights.entry(term.to_string()).or_insert(0.0);
        if weight > *entry {
            *entry = weight;
        }
        if !self.all_terms.iter().any(|t| t == term) {
            self.all_terms.push(term.to_string());
        }
    }
}
