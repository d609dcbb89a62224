//! Query expansion
//!
//! Turns a raw query string into a weighted multiset of terms from three
//! sources: the original tokens, lexical-ontology synonyms and hypernyms,
//! and the nearest corpus concepts. Expansion is deterministic for a given
//! query, lexicon cache and concept table; a failing source contributes
//! nothing instead of failing the query.

use std::sync::Arc;

use libris_domain::ids::normalize_concept;
use libris_domain::ports::{ConceptRepository, EmbeddingProvider, LexiconProvider};
use libris_domain::value_objects::{ExpandedQuery, SynsetEntry};
use tracing::warn;

/// Weight of an original query token
const ORIGINAL_WEIGHT: f32 = 1.0;
/// Weight of a lexical synonym
const SYNONYM_WEIGHT: f32 = 0.6;
/// Weight of a lexical hypernym
const HYPERNYM_WEIGHT: f32 = 0.4;
/// Concepts fetched from the corpus per query
const CORPUS_NEIGHBORS: usize = 10;
/// Related concepts contributed per corpus neighbor
const RELATED_PER_CONCEPT: usize = 5;
/// Scale applied to a corpus concept's own name
const CORPUS_CONCEPT_SCALE: f32 = 0.8;
/// Scale applied to a corpus concept's related names
const CORPUS_RELATED_SCALE: f32 = 0.5;

/// Gloss markers that indicate a technically relevant word sense
const TECHNICAL_MARKERS: &[&str] = &[
    "computer", "software", "program", "system", "data", "information", "code", "method",
    "process", "structure", "algorithm", "mathematics",
];

/// Expands raw queries into weighted term multisets
pub struct QueryExpander {
    concepts: Arc<dyn ConceptRepository>,
    lexicon: Arc<dyn LexiconProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QueryExpander {
    /// Create the expander with its dependencies
    pub fn new(
        concepts: Arc<dyn ConceptRepository>,
        lexicon: Arc<dyn LexiconProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            concepts,
            lexicon,
            embedder,
        }
    }

    /// Expand a raw query
    ///
    /// Never fails: lexical and corpus expansion degrade to empty
    /// contributions on error, leaving at least the original tokens.
    ///
    /// Weight merging keeps the maximum per term, with equal weights
    /// resolving to the earlier source. Sources therefore merge in
    /// dominance order (original, corpus, lexical): original terms always
    /// win, and a corpus concept beats a lexical expansion on a tied
    /// weight.
    pub async fn expand(&self, query: &str) -> ExpandedQuery {
        let mut expanded = ExpandedQuery::default();

        for token in tokenize_query(query) {
            expanded.original_terms.push(token.clone());
            expanded.merge_term(&token, ORIGINAL_WEIGHT);
        }

        self.expand_corpus(query, &mut expanded).await;
        self.expand_lexical(&mut expanded).await;

        expanded
    }

    /// Lexical-ontology expansion of each original term
    async fn expand_lexical(&self, expanded: &mut ExpandedQuery) {
        let original = expanded.original_terms.clone();
        for term in &original {
            let senses = match self.lexicon.lookup(term).await {
                Ok(senses) => senses,
                Err(err) => {
                    warn!(term = %term, error = %err, "lexicon lookup failed; skipping term");
                    continue;
                }
            };
            if senses.is_empty() {
                continue;
            }

            for sense in relevant_senses(senses, term, &original) {
                for synonym in &sense.synonyms {
                    self.push_lexical(expanded, synonym, SYNONYM_WEIGHT, &original);
                }
                for hypernym in &sense.hypernyms {
                    self.push_lexical(expanded, hypernym, HYPERNYM_WEIGHT, &original);
                }
            }
        }
    }

    fn push_lexical(
        &self,
        expanded: &mut ExpandedQuery,
        raw: &str,
        weight: f32,
        original: &[String],
    ) {
        let term = normalize_concept(raw);
        if term.len() <= 2 || original.contains(&term) {
            return;
        }
        if !expanded.lexical_terms.contains(&term) {
            expanded.lexical_terms.push(term.clone());
        }
        expanded.merge_term(&term, weight);
    }

    /// Corpus-concept expansion from the nearest concepts to the full query
    async fn expand_corpus(&self, query: &str, expanded: &mut ExpandedQuery) {
        let qvec = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!(error = %err, "query embedding failed; skipping corpus expansion");
                return;
            }
        };
        let hits = match self
            .concepts
            .vector_search(&qvec.vector, CORPUS_NEIGHBORS)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, "concept search failed; skipping corpus expansion");
                return;
            }
        };

        for hit in hits {
            let proximity = (1.0 - hit.distance).clamp(0.0, 1.0);
            self.push_corpus(expanded, &hit.row.concept, proximity * CORPUS_CONCEPT_SCALE);

            let related_ids: Vec<i32> = hit
                .row
                .related_concept_ids
                .iter()
                .take(RELATED_PER_CONCEPT)
                .copied()
                .collect();
            let related = match self.concepts.find_by_ids(&related_ids).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(error = %err, "related concept lookup failed");
                    continue;
                }
            };
            for row in related {
                self.push_corpus(expanded, &row.concept, proximity * CORPUS_RELATED_SCALE);
            }
        }
    }

    fn push_corpus(&self, expanded: &mut ExpandedQuery, raw: &str, weight: f32) {
        let term = normalize_concept(raw);
        if term.len() <= 2 {
            return;
        }
        if !expanded.corpus_terms.contains(&term) {
            expanded.corpus_terms.push(term.clone());
        }
        expanded.merge_term(&term, weight);
    }
}

/// Tokenize the raw query: lowercase, strip punctuation, drop short tokens
fn tokenize_query(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in query.to_lowercase().split_whitespace() {
        let token: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.len() > 2 && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Filter word senses by technical relevance
///
/// A sense scores for each co-occurring query term and each generic
/// technical marker appearing in its gloss. Senses scoring zero are dropped
/// unless no sense scores at all, in which case every sense is kept.
fn relevant_senses(senses: Vec<SynsetEntry>, term: &str, original: &[String]) -> Vec<SynsetEntry> {
    let scores: Vec<usize> = senses
        .iter()
        .map(|sense| {
            let gloss = sense.gloss.to_lowercase();
            let mut score = 0;
            for other in original {
                if other != term && gloss.contains(other.as_str()) {
                    score += 1;
                }
            }
            for marker in TECHNICAL_MARKERS {
                if gloss.contains(marker) {
                    score += 1;
                }
            }
            score
        })
        .collect();

    if scores.iter().all(|score| *score == 0) {
        return senses;
    }
    senses
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| *score > 0)
        .map(|(sense, _)| sense)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_short_and_duplicate_tokens() {
        assert_eq!(
            tokenize_query("The FP types, the types!"),
            vec!["the".to_string(), "types".to_string()]
        );
        // "fp" survives neither as "FP" nor lowercased: length <= 2
        assert!(!tokenize_query("FP types").contains(&"fp".to_string()));
    }

    #[test]
    fn sense_filter_prefers_technical_glosses() {
        let technical = SynsetEntry {
            synonyms: vec!["index".to_string()],
            hypernyms: vec![],
            hyponyms: vec![],
            gloss: "a data structure that improves lookup in a computer database".to_string(),
        };
        let finance = SynsetEntry {
            synonyms: vec!["exponent".to_string()],
            hypernyms: vec![],
            hyponyms: vec![],
            gloss: "a number expressing a property of a financial market".to_string(),
        };
        let kept = relevant_senses(
            vec![technical.clone(), finance],
            "index",
            &["index".to_string(), "database".to_string()],
        );
        assert_eq!(kept, vec![technical]);
    }

    #[test]
    fn sense_filter_keeps_all_when_nothing_scores() {
        let a = SynsetEntry {
            gloss: "completely unrelated prose".to_string(),
            ..Default::default()
        };
        let b = SynsetEntry {
            gloss: "equally unrelated prose".to_string(),
            ..Default::default()
        };
        let kept = relevant_senses(vec![a, b], "term", &["term".to_string()]);
        assert_eq!(kept.len(), 2);
    }
}
