//! # Libris MCP Server
//!
//! MCP protocol layer for the Libris corpus retrieval engine. Exposes the
//! retrieval tools (catalog, chunk, concept and category search) over stdio
//! and hosts the offline ingestion command.
//!
//! The crate depends on domain contracts and the infrastructure container;
//! every handler receives its service by constructor injection.

pub mod args;
pub mod formatter;
pub mod handlers;
pub mod init;
pub mod mcp_server;
pub mod tools;

pub use init::{run_ingest, run_server};
pub use mcp_server::McpServer;
