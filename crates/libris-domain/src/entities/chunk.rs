//! Chunk rows - the unit of passage retrieval

use serde::{Deserialize, Serialize};

/// A fixed-size text segment of one document
///
/// ## Invariants
///
/// - `id == hash_to_id(filename + "#" + ordinal)`
/// - every id in `concept_ids` refers to an existing concept whose
///   `catalog_ids` contains this chunk's `catalog_id`
/// - `category_ids` is set-equal to the owning document's `category_ids`
/// - all chunks of one document share the document's `hash`
///
/// Chunks are bulk-inserted per document and cascade-deleted when the owning
/// document is re-ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRow {
    /// Primary key, derived from `filename#ordinal`
    pub id: i32,
    /// Owning document
    pub catalog_id: i32,
    /// Content hash of the owning document (cascade-delete key)
    pub hash: String,
    /// Chunk body, single-paragraph granularity, target 500-1500 chars
    pub text: String,
    /// Embedding of `text`
    pub vector: Vec<f32>,
    /// Concepts this chunk mentions
    pub concept_ids: Vec<i32>,
    /// Denormalized copy of the owning document's categories
    pub category_ids: Vec<i32>,
    /// Opaque loader-produced location blob (page/line range JSON)
    #[serde(default)]
    pub loc: String,
}
