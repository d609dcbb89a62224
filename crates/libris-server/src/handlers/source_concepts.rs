//! source_concepts tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::CatalogSearchService;

use crate::args::SourceConceptsArgs;
use crate::formatter::ResponseFormatter;

/// Handler for listing one document's concepts by frequency
pub struct SourceConceptsHandler {
    service: Arc<CatalogSearchService>,
}

impl SourceConceptsHandler {
    /// Create the handler
    pub fn new(service: Arc<CatalogSearchService>) -> Self {
        Self { service }
    }

    /// Handle a source_concepts call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<SourceConceptsArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.source = args.source.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self.service.source_concepts(&args.source, args.limit).await {
            Ok(Some(concepts)) => ResponseFormatter::json(serde_json::json!({
                "source": args.source,
                "total": concepts.len(),
                "concepts": concepts
                    .iter()
                    .map(ResponseFormatter::concept)
                    .collect::<Vec<_>>(),
            })),
            Ok(None) => ResponseFormatter::json(serde_json::json!({
                "source": args.source,
                "total": 0,
                "concepts": [],
                "note": "source not found in catalog",
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
