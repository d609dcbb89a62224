//! concept_sources tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::ConceptSearchService;

use crate::args::ConceptSourcesArgs;
use crate::formatter::ResponseFormatter;

/// Handler for resolving a concept to the documents mentioning it
pub struct ConceptSourcesHandler {
    service: Arc<ConceptSearchService>,
}

impl ConceptSourcesHandler {
    /// Create the handler
    pub fn new(service: Arc<ConceptSearchService>) -> Self {
        Self { service }
    }

    /// Handle a concept_sources call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<ConceptSourcesArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.concept = args.concept.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self.service.sources(&args.concept, args.limit).await {
            Ok(sources) => ResponseFormatter::json(serde_json::json!({
                "concept": args.concept,
                "total": sources.len(),
                "sources": sources
                    .iter()
                    .map(ResponseFormatter::catalog_entry)
                    .collect::<Vec<_>>(),
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
