//! list_categories tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;

use libris_application::CategorySearchService;

use crate::args::ListCategoriesArgs;
use crate::formatter::ResponseFormatter;

/// Handler for listing the category taxonomy
pub struct ListCategoriesHandler {
    service: Arc<CategorySearchService>,
}

impl ListCategoriesHandler {
    /// Create the handler
    pub fn new(service: Arc<CategorySearchService>) -> Self {
        Self { service }
    }

    /// Handle a list_categories call
    pub async fn handle(
        &self,
        Parameters(_args): Parameters<ListCategoriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.service.list().await {
            Ok(categories) => ResponseFormatter::json(serde_json::json!({
                "total": categories.len(),
                "categories": categories
                    .iter()
                    .map(ResponseFormatter::category)
                    .collect::<Vec<_>>(),
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
