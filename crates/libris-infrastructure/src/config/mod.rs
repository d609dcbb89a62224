//! Configuration
//!
//! Typed configuration merged from defaults, a TOML file and `LIBRIS__`
//! environment variables via figment.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, ChunkingConfig, EmbeddingConfig, EmbeddingProviderKind, LexiconConfig, LlmConfig,
    LoggingConfig, ProfileOverrides, ResilienceConfig, StoreBackend, StoreConfig,
};
