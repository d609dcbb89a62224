//! Provider ports for external collaborators

use crate::error::Result;
use crate::value_objects::{DocumentSegment, Embedding, ExtractedConcepts, SynsetEntry};
use async_trait::async_trait;
use std::path::Path;

/// Text embedding provider
///
/// `embed` must be deterministic for a given provider configuration; every
/// table stores vectors of `dimensions()` length. Non-local providers are
/// wrapped with the EMBEDDING resilience profile by the container.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Fixed embedding dimension of this provider
    fn dimensions(&self) -> usize;

    /// Short provider identifier for logs and status payloads
    fn provider_name(&self) -> &str;
}

/// LLM-backed concept extraction
///
/// Calls are guarded with the LLM_API resilience profile by the ingestion
/// pipeline; a failed batch degrades to an empty extraction rather than
/// failing the document.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    /// Extract primary concepts and categories from a batch of chunk text
    async fn extract(&self, text: &str) -> Result<ExtractedConcepts>;

    /// Produce a short document summary
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Short provider identifier for logs and status payloads
    fn provider_name(&self) -> &str;
}

/// Lexical ontology lookup (synonyms, hypernyms, glosses)
///
/// Backed by an on-disk cache keyed by lower-cased term. An absent term is
/// an empty answer, not an error; querying never writes.
#[async_trait]
pub trait LexiconProvider: Send + Sync {
    /// All cached senses of a term
    async fn lookup(&self, term: &str) -> Result<Vec<SynsetEntry>>;

    /// Append senses for a term to the cache (ingestion only)
    async fn store(&self, term: &str, senses: Vec<SynsetEntry>) -> Result<()>;
}

/// Document loader for one or more source formats
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Whether this loader handles the given path
    fn supports(&self, path: &Path) -> bool;

    /// Load a document into text segments with location blobs
    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>>;
}
