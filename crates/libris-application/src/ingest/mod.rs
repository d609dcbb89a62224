//! Ingestion: chunking and the extraction pipeline

mod chunker;
mod pipeline;

pub use chunker::{chunk_segments, ChunkerConfig, PendingChunk};
pub use pipeline::{IngestReport, IngestStatus, IngestionPipeline};
