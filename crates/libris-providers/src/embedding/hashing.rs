//! Deterministic hashing embedder
//!
//! Maps each of the first 100 whitespace tokens into a bucket by FNV-1a and
//! L2-normalizes the counts. No external dependency, sub-millisecond, and
//! byte-exact across machines, which makes it the reference embedder for
//! tests and air-gapped deployments.

use async_trait::async_trait;
use libris_domain::error::{Error, Result};
use libris_domain::ids::fnv1a;
use libris_domain::ports::EmbeddingProvider;
use libris_domain::value_objects::Embedding;

/// Tokens considered per text
const MAX_TOKENS: usize = 100;

/// Deterministic bag-of-buckets embedder
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimensions` length
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_sync(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(Error::embedding("embedding dimension must be positive"));
        }
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.to_lowercase().split_whitespace().take(MAX_TOKENS) {
            let bucket = (fnv1a(token) as usize) % self.dimensions;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(Embedding {
            vector: self.embed_sync(text)?,
            model: "hashing".to_string(),
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedding_is_byte_exact_across_calls() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        assert_eq!(a.vector, b.vector);
        assert_eq!(a.dimensions, 384);
        assert_eq!(a.vector.len(), 384);
    }

    #[tokio::test]
    async fn embedding_is_unit_norm() {
        let embedder = HashingEmbedder::default();
        let e = embedder.embed("the quick brown fox jumps over the lazy dog").await.unwrap();
        assert!((e.norm() - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::default();
        let e = embedder.embed("").await.unwrap();
        assert!(e.vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn case_is_folded_before_hashing() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Database INTERNALS").await.unwrap();
        let b = embedder.embed("database internals").await.unwrap();
        assert_eq!(a.vector, b.vector);
    }

    #[tokio::test]
    async fn token_cap_bounds_the_input() {
        let embedder = HashingEmbedder::default();
        let first_100 = "tok ".repeat(100);
        let with_extra = format!("{} extra tokens beyond the cap", first_100);
        let a = embedder.embed(&first_100).await.unwrap();
        let b = embedder.embed(&with_extra).await.unwrap();
        assert_eq!(a.vector, b.vector);
    }
}
