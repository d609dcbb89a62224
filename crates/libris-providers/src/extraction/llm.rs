//! LLM-backed concept extraction
//!
//! Prompts a chat-completions endpoint for a strict JSON object of primary
//! concepts and categories, and for one-paragraph document summaries. The
//! caller wraps invocations with the LLM_API resilience profile.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use libris_domain::error::{Error, Result};
use libris_domain::ports::ConceptExtractor;
use libris_domain::value_objects::ExtractedConcepts;

use super::json::extract_json;

const EXTRACT_SYSTEM_PROMPT: &str = "You are an indexing assistant for a technical library. \
    Given text from a document, identify the canonical concepts it discusses and coarse \
    subject categories for the whole document. Respond with ONLY a JSON object of the form \
    {\"primary_concepts\": [\"...\"], \"categories\": [\"...\"]}. Use short noun phrases, \
    no duplicates, at most 15 concepts and 7 categories.";

const SUMMARY_SYSTEM_PROMPT: &str = "You summarize documents for a library catalog. \
    Respond with a single plain-text paragraph of at most 80 words describing what the \
    document covers. No preamble, no markdown.";

/// Configuration for the LLM extractor
#[derive(Debug, Clone)]
pub struct LlmExtractorConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint
    pub base_url: String,
    /// Bearer token; empty disables the Authorization header
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Chat-completions concept extractor
pub struct LlmConceptExtractor {
    config: LlmExtractorConfig,
    http_client: Client,
}

impl LlmConceptExtractor {
    /// Create the extractor; fails if the HTTP client cannot be constructed
    pub fn new(config: LlmExtractorConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::extraction(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// One chat-completions round trip, returning the assistant text
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.0,
        });

        let mut request = self
            .http_client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&payload);
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout("llm.request", self.config.timeout.as_millis() as u64)
            } else {
                Error::extraction(format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::extraction(format!(
                "LLM endpoint returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::extraction(format!("invalid JSON response: {}", e)))?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::extraction("response missing message content"))
    }
}

#[async_trait]
impl ConceptExtractor for LlmConceptExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedConcepts> {
        let content = self.complete(EXTRACT_SYSTEM_PROMPT, text).await?;
        extract_json(&content)
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let summary = self.complete(SUMMARY_SYSTEM_PROMPT, text).await?;
        Ok(summary.trim().to_string())
    }

    fn provider_name(&self) -> &str {
        "llm"
    }
}
