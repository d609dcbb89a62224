//! catalog_search tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::CatalogSearchService;

use crate::args::CatalogSearchArgs;
use crate::formatter::ResponseFormatter;

/// Handler for document-level hybrid search
pub struct CatalogSearchHandler {
    service: Arc<CatalogSearchService>,
}

impl CatalogSearchHandler {
    /// Create the handler
    pub fn new(service: Arc<CatalogSearchService>) -> Self {
        Self { service }
    }

    /// Handle a catalog_search call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<CatalogSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.text = args.text.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self
            .service
            .search(&args.text, args.limit, args.debug)
            .await
        {
            Ok(results) => ResponseFormatter::json(serde_json::json!({
                "query": args.text,
                "total": results.len(),
                "documents": results
                    .iter()
                    .map(ResponseFormatter::document)
                    .collect::<Vec<_>>(),
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
