//! Tool dispatch
//!
//! Routes an incoming tool call to its handler. Malformed argument objects
//! are answered as `isError` results without touching the service layer;
//! only an unknown tool name is a protocol error.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolRequestParam, CallToolResult};
use rmcp::ErrorData as McpError;
use std::sync::Arc;

use libris_infrastructure::AppContainer;

use crate::formatter::ResponseFormatter;
use crate::handlers::{
    BroadChunksSearchHandler, CatalogSearchHandler, CategorySearchHandler, ChunksSearchHandler,
    ConceptSearchHandler, ConceptSourcesHandler, CorpusStatusHandler, ExtractConceptsHandler,
    ListCategoriesHandler, SourceConceptsHandler,
};

/// Handler references for tool routing
pub struct ToolHandlers {
    /// Document-level hybrid search
    pub catalog_search: Arc<CatalogSearchHandler>,
    /// Within-document chunk search
    pub chunks_search: Arc<ChunksSearchHandler>,
    /// Corpus-wide chunk search
    pub broad_chunks_search: Arc<BroadChunksSearchHandler>,
    /// Concept-centric retrieval
    pub concept_search: Arc<ConceptSearchHandler>,
    /// Stored-concept report
    pub extract_concepts: Arc<ExtractConceptsHandler>,
    /// Per-document concepts
    pub source_concepts: Arc<SourceConceptsHandler>,
    /// Concept-to-document resolution
    pub concept_sources: Arc<ConceptSourcesHandler>,
    /// Category documents
    pub category_search: Arc<CategorySearchHandler>,
    /// Category taxonomy
    pub list_categories: Arc<ListCategoriesHandler>,
    /// Corpus and health overview
    pub corpus_status: Arc<CorpusStatusHandler>,
}

impl ToolHandlers {
    /// Wire every handler against a built container
    pub fn wire(container: Arc<AppContainer>) -> Self {
        Self {
            catalog_search: Arc::new(CatalogSearchHandler::new(Arc::clone(
                &container.catalog_search,
            ))),
            chunks_search: Arc::new(ChunksSearchHandler::new(Arc::clone(&container.chunk_search))),
            broad_chunks_search: Arc::new(BroadChunksSearchHandler::new(Arc::clone(
                &container.chunk_search,
            ))),
            concept_search: Arc::new(ConceptSearchHandler::new(Arc::clone(
                &container.concept_search,
            ))),
            extract_concepts: Arc::new(ExtractConceptsHandler::new(Arc::clone(
                &container.catalog_search,
            ))),
            source_concepts: Arc::new(SourceConceptsHandler::new(Arc::clone(
                &container.catalog_search,
            ))),
            concept_sources: Arc::new(ConceptSourcesHandler::new(Arc::clone(
                &container.concept_search,
            ))),
            category_search: Arc::new(CategorySearchHandler::new(Arc::clone(
                &container.category_search,
            ))),
            list_categories: Arc::new(ListCategoriesHandler::new(Arc::clone(
                &container.category_search,
            ))),
            corpus_status: Arc::new(CorpusStatusHandler::new(container)),
        }
    }
}

/// Route a tool call request to the appropriate handler
pub async fn route_tool_call(
    request: CallToolRequestParam,
    handlers: &ToolHandlers,
) -> Result<CallToolResult, McpError> {
    macro_rules! dispatch {
        ($handler:expr) => {
            match parse_args(&request) {
                Ok(args) => $handler.handle(Parameters(args)).await,
                Err(message) => Ok(ResponseFormatter::validation_error(message)),
            }
        };
    }

    match request.name.as_ref() {
        "catalog_search" => dispatch!(handlers.catalog_search),
        "chunks_search" => dispatch!(handlers.chunks_search),
        "broad_chunks_search" => dispatch!(handlers.broad_chunks_search),
        "concept_search" => dispatch!(handlers.concept_search),
        "extract_concepts" => dispatch!(handlers.extract_concepts),
        "source_concepts" => dispatch!(handlers.source_concepts),
        "concept_sources" => dispatch!(handlers.concept_sources),
        "category_search" => dispatch!(handlers.category_search),
        "list_categories" => dispatch!(handlers.list_categories),
        "corpus_status" => dispatch!(handlers.corpus_status),
        _ => Err(McpError::invalid_params(
            format!("Unknown tool: {}", request.name),
            None,
        )),
    }
}

/// Parse request arguments into the expected type
fn parse_args<T: serde::de::DeserializeOwned>(
    request: &CallToolRequestParam,
) -> Result<T, String> {
    let args_value = serde_json::Value::Object(request.arguments.clone().unwrap_or_default());
    serde_json::from_value(args_value).map_err(|e| e.to_string())
}
