//! Weighted BM25 scoring
//!
//! A BM25 variant over expanded query terms. Term matching is substring in
//! either direction so that surface variants like "testing" and "tested"
//! count as hits without a stemmer, at the cost of occasional false
//! positives. Document length is normalized against a fixed average rather
//! than a maintained corpus statistic, which keeps scoring stateless.

use libris_domain::value_objects::ExpandedQuery;

/// Term frequency saturation parameter
pub const K1: f32 = 1.5;
/// Document length normalization parameter
pub const B: f32 = 0.75;
/// Fixed average document length, in tokens
pub const AVG_DOC_LEN: f32 = 100.0;

/// Tokenize text for BM25: lowercase, strip non-alphanumerics, drop short tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|token| token.len() > 2)
        .collect()
}

/// Whether a query term matches a document token
///
/// Substring containment in either direction.
fn term_matches(term: &str, token: &str) -> bool {
    token.contains(term) || term.contains(token)
}

/// Weighted BM25 score of a document against an expanded query
///
/// The document is the concatenation of body text and source name. Each
/// expanded term contributes its saturated term-frequency factor multiplied
/// by the term's expansion weight; the sum is normalized by the number of
/// expanded terms and clamped to `[0, 1]`.
pub fn score(body: &str, source: &str, query: &ExpandedQuery) -> f32 {
    if query.all_terms.is_empty() {
        return 0.0;
    }

    let mut doc_tokens = tokenize(body);
    doc_tokens.extend(tokenize(source));
    let doc_len = doc_tokens.len() as f32;

    let mut total = 0.0;
    for term in &query.all_terms {
        let tf = doc_tokens
            .iter()
            .filter(|token| term_matches(term, token))
            .count() as f32;
        if tf > 0.0 {
            let saturated =
                (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * doc_len / AVG_DOC_LEN));
            total += saturated * query.weight(term);
        }
    }

    (total / query.all_terms.len() as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(terms: &[(&str, f32)]) -> ExpandedQuery {
        let mut q = ExpandedQuery::default();
        for (term, weight) in terms {
            q.merge_term(term, *weight);
        }
        q
    }

    #[test]
    fn tokenize_strips_punctuation_and_short_tokens() {
        let tokens = tokenize("The B-tree index, in a database!");
        assert_eq!(tokens, vec!["the", "btree", "index", "database"]);
    }

    #[test]
    fn matching_term_scores_positive() {
        let q = query_of(&[("index", 1.0)]);
        let s = score("the btree index structure", "db-internals.pdf", &q);
        assert!(s > 0.0);
        assert!(s <= 1.0);
    }

    #[test]
    fn substring_matches_both_directions() {
        // "testing" as a query term matches the token "tested".
        let q = query_of(&[("testing", 1.0)]);
        assert_eq!(score("the code was tested", "a.txt", &q), 0.0);
        let q = query_of(&[("test", 1.0)]);
        assert!(score("the code was tested", "a.txt", &q) > 0.0);
        // Superstring direction: token "test" matches term "testing".
        let q = query_of(&[("testing", 1.0)]);
        assert!(score("run the test suite", "a.txt", &q) > 0.0);
    }

    #[test]
    fn unmatched_query_scores_zero() {
        let q = query_of(&[("zebra", 1.0)]);
        assert_eq!(score("functional programming in practice", "fp.pdf", &q), 0.0);
    }

    #[test]
    fn expansion_weight_scales_contribution() {
        let original = query_of(&[("index", 1.0)]);
        let expanded = query_of(&[("index", 0.4)]);
        let body = "the btree index structure";
        assert!(score(body, "x", &original) > score(body, "x", &expanded));
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(score("anything", "x", &ExpandedQuery::default()), 0.0);
    }
}
