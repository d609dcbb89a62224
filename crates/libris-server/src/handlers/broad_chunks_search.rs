//! broad_chunks_search tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::ChunkSearchService;

use crate::args::BroadChunksSearchArgs;
use crate::formatter::ResponseFormatter;

/// Handler for corpus-wide passage search
pub struct BroadChunksSearchHandler {
    service: Arc<ChunkSearchService>,
}

impl BroadChunksSearchHandler {
    /// Create the handler
    pub fn new(service: Arc<ChunkSearchService>) -> Self {
        Self { service }
    }

    /// Handle a broad_chunks_search call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<BroadChunksSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.text = args.text.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self
            .service
            .broad_search(&args.text, args.limit, args.debug)
            .await
        {
            Ok(hits) => ResponseFormatter::json(serde_json::json!({
                "query": args.text,
                "total": hits.len(),
                "chunks": hits
                    .iter()
                    .map(ResponseFormatter::chunk_hit)
                    .collect::<Vec<_>>(),
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
