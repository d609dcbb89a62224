//! Corpus entities
//!
//! The four-table normalized data model. All primary keys are `i32` values
//! produced by [`crate::ids::hash_to_id`], and every cross-reference is a
//! native integer array, never an encoded string.

mod catalog;
mod category;
mod chunk;
mod concept;

pub use catalog::CatalogEntry;
pub use category::CategoryRow;
pub use chunk::ChunkRow;
pub use concept::ConceptRow;
