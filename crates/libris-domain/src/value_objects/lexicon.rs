//! Lexical ontology value objects

use serde::{Deserialize, Serialize};

/// One word sense of a term in the lexical ontology
///
/// Synonyms expand a query at weight 0.6, hypernyms at 0.4. The gloss is
/// used only for sense filtering (technical-relevance scoring) and is never
/// matched against documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SynsetEntry {
    /// Synonymous lemmas of this sense
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// One level of hypernyms (broader terms)
    #[serde(default)]
    pub hypernyms: Vec<String>,
    /// Hyponyms (narrower terms), used for enrichment only
    #[serde(default)]
    pub hyponyms: Vec<String>,
    /// Definition text for sense filtering
    #[serde(default)]
    pub gloss: String,
}
