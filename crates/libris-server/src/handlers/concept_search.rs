//! concept_search tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::ConceptSearchService;
use libris_domain::value_objects::ConceptSortBy;

use crate::args::ConceptSearchArgs;
use crate::formatter::ResponseFormatter;

/// Handler for concept-centric chunk retrieval
pub struct ConceptSearchHandler {
    service: Arc<ConceptSearchService>,
}

impl ConceptSearchHandler {
    /// Create the handler
    pub fn new(service: Arc<ConceptSearchService>) -> Self {
        Self { service }
    }

    /// Handle a concept_search call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<ConceptSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.concept = args.concept.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }
        // Validation already rejected unknown orders.
        let sort_by = args
            .sort_by
            .as_deref()
            .and_then(|s| s.parse::<ConceptSortBy>().ok())
            .unwrap_or_default();

        match self
            .service
            .search(&args.concept, args.limit, args.source_filter.as_deref(), sort_by)
            .await
        {
            Ok(outcome) => ResponseFormatter::json(serde_json::json!({
                "concept": outcome.concept,
                "totalFound": outcome.total_found,
                "chunks": outcome
                    .chunks
                    .iter()
                    .map(ResponseFormatter::chunk)
                    .collect::<Vec<_>>(),
                "relatedConcepts": outcome.related_concepts,
                "conceptMetadata": outcome
                    .concept_metadata
                    .as_ref()
                    .map(ResponseFormatter::concept),
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
