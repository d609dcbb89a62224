//! Embedding providers
//!
//! [`HashingEmbedder`] is the deterministic offline default; [`OpenAiEmbedder`]
//! talks to any OpenAI-compatible embeddings endpoint and is wrapped with the
//! EMBEDDING resilience profile by the container.

mod hashing;
mod openai;

pub use hashing::HashingEmbedder;
pub use openai::{OpenAiEmbedder, OpenAiEmbedderConfig};
