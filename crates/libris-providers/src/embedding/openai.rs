//! OpenAI-compatible embedding provider
//!
//! Implements the embedding port against any endpoint speaking the OpenAI
//! `/embeddings` shape (OpenAI itself, Ollama, local gateways). The vector
//! dimension is part of the deployment configuration and must match the
//! store; a response of a different width is rejected.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use libris_domain::error::{Error, Result};
use libris_domain::ports::EmbeddingProvider;
use libris_domain::value_objects::Embedding;

/// Configuration for the OpenAI-compatible embedder
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer token; empty disables the Authorization header
    pub api_key: String,
    /// Model name, e.g. `text-embedding-3-small`
    pub model: String,
    /// Expected vector dimension
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

/// OpenAI-compatible embeddings client
pub struct OpenAiEmbedder {
    config: OpenAiEmbedderConfig,
    http_client: Client,
}

impl OpenAiEmbedder {
    /// Create the provider; fails if the HTTP client cannot be constructed
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::embedding(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn fetch(&self, texts: &[String]) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "input": texts,
            "model": self.config.model,
            "encoding_format": "float",
        });

        let mut request = self
            .http_client
            .post(format!(
                "{}/embeddings",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&payload);
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout("embedding.request", self.config.timeout.as_millis() as u64)
            } else {
                Error::embedding(format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "embedding endpoint returned {}: {}",
                status, body
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("invalid JSON response: {}", e)))
    }

    fn parse_embedding(&self, index: usize, item: &serde_json::Value) -> Result<Embedding> {
        let vector: Vec<f32> = item["embedding"]
            .as_array()
            .ok_or_else(|| Error::embedding(format!("missing embedding for input {}", index)))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        if vector.len() != self.config.dimensions {
            return Err(Error::embedding(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.config.dimensions,
                vector.len()
            )));
        }

        Ok(Embedding {
            vector,
            model: self.config.model.clone(),
            dimensions: self.config.dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .pop()
            .ok_or_else(|| Error::embedding("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.fetch(texts).await?;
        let data = body["data"]
            .as_array()
            .ok_or_else(|| Error::embedding("response missing data array"))?;
        if data.len() != texts.len() {
            return Err(Error::embedding(format!(
                "response count mismatch: expected {}, got {}",
                texts.len(),
                data.len()
            )));
        }

        data.iter()
            .enumerate()
            .map(|(i, item)| self.parse_embedding(i, item))
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiEmbedder {
        OpenAiEmbedder::new(OpenAiEmbedderConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: String::new(),
            model: "test-model".to_string(),
            dimensions: 3,
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn parse_rejects_dimension_mismatch() {
        let item = serde_json::json!({"embedding": [0.1, 0.2]});
        let err = provider().parse_embedding(0, &item).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn parse_accepts_matching_vector() {
        let item = serde_json::json!({"embedding": [0.1, 0.2, 0.3]});
        let embedding = provider().parse_embedding(0, &item).unwrap();
        assert_eq!(embedding.vector.len(), 3);
        assert_eq!(embedding.model, "test-model");
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let out = provider().embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }
}
