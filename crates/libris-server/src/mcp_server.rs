//! MCP server implementation
//!
//! Implements the MCP protocol over the retrieval services. All
//! dependencies arrive through the application container; the server only
//! routes.

use std::sync::Arc;

use rmcp::model::{
    CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
    ServerCapabilities, ServerInfo,
};
use rmcp::ErrorData as McpError;
use rmcp::ServerHandler;

use libris_infrastructure::AppContainer;

use crate::tools::{create_tool_list, route_tool_call, ToolHandlers};

/// The Libris MCP server
#[derive(Clone)]
pub struct McpServer {
    handlers: Arc<ToolHandlers>,
}

impl McpServer {
    /// Create the server over a built container
    pub fn new(container: Arc<AppContainer>) -> Self {
        Self {
            handlers: Arc::new(ToolHandlers::wire(container)),
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "Libris".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Libris - concept-indexed retrieval over a document corpus\n\n\
                 Tools:\n\
                 - catalog_search: find documents by hybrid relevance\n\
                 - broad_chunks_search / chunks_search: find passages corpus-wide or within a document\n\
                 - concept_search: resolve a concept to the passages discussing it\n\
                 - extract_concepts / source_concepts / concept_sources: navigate the concept graph\n\
                 - category_search / list_categories: browse the taxonomy\n\
                 - corpus_status: table counts and dependency health\n"
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: create_tool_list()?,
            meta: Default::default(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        route_tool_call(request, &self.handlers).await
    }
}
