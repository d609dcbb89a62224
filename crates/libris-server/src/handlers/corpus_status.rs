//! corpus_status tool handler

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use std::sync::Arc;

use libris_infrastructure::AppContainer;

use crate::args::CorpusStatusArgs;
use crate::formatter::ResponseFormatter;

/// Handler for the corpus and dependency health overview
pub struct CorpusStatusHandler {
    container: Arc<AppContainer>,
}

impl CorpusStatusHandler {
    /// Create the handler
    pub fn new(container: Arc<AppContainer>) -> Self {
        Self { container }
    }

    /// Handle a corpus_status call
    pub async fn handle(
        &self,
        Parameters(_args): Parameters<CorpusStatusArgs>,
    ) -> Result<CallToolResult, McpError> {
        let counts = async {
            let documents = self.container.catalog.count().await?;
            let chunks = self.container.chunks.count().await?;
            let concepts = self.container.concepts.count().await?;
            let categories = self.container.categories.count().await?;
            libris_domain::error::Result::Ok((documents, chunks, concepts, categories))
        }
        .await;

        match counts {
            Ok((documents, chunks, concepts, categories)) => {
                let health = self.container.health();
                ResponseFormatter::json(serde_json::json!({
                    "tables": {
                        "documents": documents,
                        "chunks": chunks,
                        "concepts": concepts,
                        "categories": categories,
                    },
                    "store": self.container.store.provider_name(),
                    "embedding": {
                        "provider": self.container.embedder.provider_name(),
                        "dimensions": self.container.embedder.dimensions(),
                    },
                    "health": health,
                }))
            }
            Err(err) => Ok(ResponseFormatter::service_error(&err)),
        }
    }
}
