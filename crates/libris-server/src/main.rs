//! Libris - concept-indexed corpus retrieval over MCP
//!
//! Two modes:
//!
//! | Mode | Command | Description |
//! |------|---------|-------------|
//! | **Serve** | `libris serve` | MCP tools over stdio |
//! | **Ingest** | `libris ingest <paths…>` | Offline batch ingestion epoch |

use clap::{Parser, Subcommand};
use libris_server::{run_ingest, run_server};

/// Command line interface for the Libris server
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(about = "Concept-indexed corpus retrieval server (MCP)")]
#[command(version)]
struct Cli {
    /// Path to a configuration file (defaults to ./libris.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the MCP tools over stdio
    Serve,
    /// Ingest documents into the corpus store
    Ingest {
        /// Source files to ingest
        #[arg(required = true)]
        paths: Vec<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_server(cli.config.as_deref()).await,
        Command::Ingest { paths } => run_ingest(cli.config.as_deref(), &paths).await,
    }
}
