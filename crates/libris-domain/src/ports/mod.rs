//! Port traits implemented by the provider layer
//!
//! Repositories expose typed CRUD, indexed finders and vector search over the
//! four tables; provider ports wrap the external collaborators (embedding,
//! LLM extraction, lexical ontology, document loading). Services depend only
//! on these traits and receive implementations through the application
//! container.

mod providers;
mod repositories;

pub use providers::{ConceptExtractor, DocumentLoader, EmbeddingProvider, LexiconProvider};
pub use repositories::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptRepository,
};
