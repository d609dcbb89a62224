//! MCP tool handlers
//!
//! One handler per tool: validate the arguments, delegate to a service,
//! format the JSON payload. Validation failures never reach the services.

pub mod broad_chunks_search;
pub mod catalog_search;
pub mod category_search;
pub mod chunks_search;
pub mod concept_search;
pub mod concept_sources;
pub mod corpus_status;
pub mod extract_concepts;
pub mod list_categories;
pub mod source_concepts;

pub use broad_chunks_search::BroadChunksSearchHandler;
pub use catalog_search::CatalogSearchHandler;
pub use category_search::CategorySearchHandler;
pub use chunks_search::ChunksSearchHandler;
pub use concept_search::ConceptSearchHandler;
pub use concept_sources::ConceptSourcesHandler;
pub use corpus_status::CorpusStatusHandler;
pub use extract_concepts::ExtractConceptsHandler;
pub use list_categories::ListCategoriesHandler;
pub use source_concepts::SourceConceptsHandler;
