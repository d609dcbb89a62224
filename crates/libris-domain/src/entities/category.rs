//! Category rows - the coarse document taxonomy

use serde::{Deserialize, Serialize};

/// A taxonomic label applied to documents
///
/// `document_count` caches the number of catalog rows carrying this id in
/// their `category_ids`; it is recomputed whenever ingestion touches the
/// category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRow {
    /// Primary key, derived from the lower-cased name
    pub id: i32,
    /// Display name
    pub name: String,
    /// Cached count of documents filed under this category
    pub document_count: i32,
}
