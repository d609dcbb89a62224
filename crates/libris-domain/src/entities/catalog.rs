//! Catalog rows - one entry per ingested source document

use serde::{Deserialize, Serialize};

/// One ingested source document
///
/// ## Invariants
///
/// - `id == hash_to_id(filename)`
/// - `vector` has the deployment's embedding dimension and embeds `text`
/// - `hash` uniquely identifies the source bytes; re-ingesting the same
///   `(filename, hash)` pair is a no-op
///
/// Rows are created once at ingest and never mutated by query traffic;
/// re-ingest of changed content is delete-by-filename plus insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Primary key, derived from `filename`
    pub id: i32,
    /// Basename of the source file; the key input for `id`
    pub filename: String,
    /// Content hash of the source bytes (idempotent re-ingest detection)
    pub hash: String,
    /// Short generated summary of the document
    pub text: String,
    /// Embedding of `text`
    pub vector: Vec<f32>,
    /// Categories this document is filed under
    pub category_ids: Vec<i32>,
    /// Reserved bibliographic metadata, may be empty
    #[serde(default)]
    pub title: String,
    /// Reserved bibliographic metadata, may be empty
    #[serde(default)]
    pub author: String,
    /// Reserved bibliographic metadata, may be empty
    #[serde(default)]
    pub year: String,
    /// Reserved bibliographic metadata, may be empty
    #[serde(default)]
    pub publisher: String,
    /// Reserved bibliographic metadata, may be empty
    #[serde(default)]
    pub isbn: String,
}
