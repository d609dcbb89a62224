//! Server initialization
//!
//! Startup sequence: load configuration, initialize logging, build the
//! application container, then either serve MCP over stdio or run the
//! offline ingestion batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::{error, info};

use libris_infrastructure::config::ConfigLoader;
use libris_infrastructure::{logging, AppContainer};

use crate::McpServer;

/// Run the MCP server over stdio until the client disconnects
pub async fn run_server(config_path: Option<&Path>) -> anyhow::Result<()> {
    let container = bootstrap(config_path).await?;
    let server = McpServer::new(container);

    info!("starting MCP server on stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

/// Ingest documents as an offline batch and print a per-file summary
///
/// Ingestion and query traffic are disjoint epochs; running ingestion as a
/// separate process invocation is what enforces the single-writer
/// assumption.
pub async fn run_ingest(config_path: Option<&Path>, paths: &[PathBuf]) -> anyhow::Result<()> {
    let container = bootstrap(config_path).await?;

    let mut failures = 0usize;
    for path in paths {
        match container.pipeline.ingest_path(path).await {
            Ok(report) => {
                println!(
                    "{}: {:?} ({} chunks, {} concepts{})",
                    report.filename,
                    report.status,
                    report.chunk_count,
                    report.concept_count,
                    if report.extraction_complete {
                        ""
                    } else {
                        ", extraction incomplete"
                    }
                );
            }
            Err(err) => {
                failures += 1;
                error!(path = %path.display(), error = %err, "ingestion failed");
                println!("{}: FAILED ({})", path.display(), err);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} documents failed to ingest", failures, paths.len());
    }
    Ok(())
}

async fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<Arc<AppContainer>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;
    logging::init_logging(&config.logging)?;

    let container = AppContainer::build(config).await?;
    Ok(container)
}
