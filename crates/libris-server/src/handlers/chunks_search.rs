//! chunks_search tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;
use validator::Validate;

use libris_application::ChunkSearchService;

use crate::args::ChunksSearchArgs;
use crate::formatter::ResponseFormatter;

/// Handler for within-document chunk search
pub struct ChunksSearchHandler {
    service: Arc<ChunkSearchService>,
}

impl ChunksSearchHandler {
    /// Create the handler
    pub fn new(service: Arc<ChunkSearchService>) -> Self {
        Self { service }
    }

    /// Handle a chunks_search call
    pub async fn handle(
        &self,
        Parameters(mut args): Parameters<ChunksSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        args.text = args.text.trim().to_string();
        args.source = args.source.trim().to_string();
        if let Err(e) = args.validate() {
            return Ok(ResponseFormatter::validation_error(e.to_string()));
        }

        match self
            .service
            .search_within(&args.text, &args.source, args.limit)
            .await
        {
            Ok(Some(hits)) => ResponseFormatter::json(serde_json::json!({
                "query": args.text,
                "source": args.source,
                "total": hits.len(),
                "chunks": hits
                    .iter()
                    .map(ResponseFormatter::chunk_hit)
                    .collect::<Vec<_>>(),
            })),
            // Unknown source: a well-formed empty result, not an error.
            Ok(None) => ResponseFormatter::json(serde_json::json!({
                "query": args.text,
                "source": args.source,
                "total": 0,
                "chunks": [],
                "note": "source not found in catalog",
            })),
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
