//! category_search tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::CategorySearchService;

use crate::args::CategorySearchArgs;
use crate::formatter::ResponseFormatter;

/// Handler for listing a category's documents and concepts
pub struct CategorySearchHandler {
    service: Arc<CategorySearchService>,
}

impl CategorySearchHandler {
    /// Create the handler
    pub fn new(service: Arc<CategorySearchService>) -> Self {
        Self { service }
    }

    /// Handle a category_search call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<CategorySearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.category = args.category.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self.service.documents(&args.category).await {
            Ok(Some((category, documents, concepts))) => {
                ResponseFormatter::json(serde_json::json!({
                    "category": ResponseFormatter::category(&category),
                    "documents": documents
                        .iter()
                        .map(ResponseFormatter::catalog_entry)
                        .collect::<Vec<_>>(),
                    "concepts": concepts
                        .iter()
                        .map(ResponseFormatter::concept)
                        .collect::<Vec<_>>(),
                }))
            }
            Ok(None) => ResponseFormatter::json(serde_json::json!({
                "category": null,
                "documents": [],
                "concepts": [],
                "note": "category not found",
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
