//! Search services
//!
//! [`HybridSearchService`] is the ranking core; the remaining services are
//! thin orchestrators binding one tool each to the repositories.

pub mod bm25;
mod catalog;
mod category;
mod chunks;
mod concept;
mod hybrid;

pub use catalog::{CatalogSearchService, ConceptReport};
pub use category::CategorySearchService;
pub use chunks::{ChunkHit, ChunkSearchService};
pub use concept::ConceptSearchService;
pub use hybrid::{
    HybridSearchService, BM25_WEIGHT, CONCEPT_WEIGHT, TITLE_WEIGHT, VECTOR_WEIGHT,
    WORDNET_WEIGHT,
};
