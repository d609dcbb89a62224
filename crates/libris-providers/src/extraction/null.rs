//! Null concept extractor

use async_trait::async_trait;

use libris_domain::error::Result;
use libris_domain::ports::ConceptExtractor;
use libris_domain::value_objects::ExtractedConcepts;

/// Extractor that finds nothing
///
/// Used when no LLM endpoint is configured and as the graceful-degradation
/// fallback. Documents ingested through it remain searchable by vector,
/// BM25 and title signals.
#[derive(Default)]
pub struct NullConceptExtractor;

impl NullConceptExtractor {
    /// Create a null extractor
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConceptExtractor for NullConceptExtractor {
    async fn extract(&self, _text: &str) -> Result<ExtractedConcepts> {
        Ok(ExtractedConcepts::default())
    }

    async fn summarize(&self, _text: &str) -> Result<String> {
        Ok(String::new())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
