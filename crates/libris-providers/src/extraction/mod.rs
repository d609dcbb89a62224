//! Concept extraction providers
//!
//! [`LlmConceptExtractor`] prompts a chat-completions endpoint for strict
//! JSON; [`NullConceptExtractor`] returns empty extractions and serves as
//! both the unconfigured default and the degradation fallback.

mod json;
mod llm;
mod null;

pub use json::extract_json;
pub use llm::{LlmConceptExtractor, LlmExtractorConfig};
pub use null::NullConceptExtractor;
