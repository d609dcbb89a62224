//! extract_concepts tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::CatalogSearchService;

use crate::args::ExtractConceptsArgs;
use crate::formatter::ResponseFormatter;

/// Handler for reading a document's stored concepts and categories
pub struct ExtractConceptsHandler {
    service: Arc<CatalogSearchService>,
}

impl ExtractConceptsHandler {
    /// Create the handler
    pub fn new(service: Arc<CatalogSearchService>) -> Self {
        Self { service }
    }

    /// Handle an extract_concepts call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<ExtractConceptsArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.source = args.source.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self.service.extract_concepts(&args.source).await {
            Ok(Some(report)) => ResponseFormatter::json(serde_json::json!({
                "source": args.source,
                "primary_concepts": report.primary_concepts,
                "categories": report.categories,
                "related_concepts": report.related_concepts,
            })),
            Ok(None) => ResponseFormatter::json(serde_json::json!({
                "source": args.source,
                "primary_concepts": [],
                "categories": [],
                "related_concepts": [],
                "note": "source not found in catalog",
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
