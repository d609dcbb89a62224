//! Configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_LEXICON_CACHE, DEFAULT_STORE_ROOT,
};
use crate::resilience::ResilienceProfile;

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store backend and location
    pub store: StoreConfig,
    /// Embedding provider selection
    pub embedding: EmbeddingConfig,
    /// LLM extractor endpoint; empty URL selects the null extractor
    pub llm: LlmConfig,
    /// Lexicon cache location
    pub lexicon: LexiconConfig,
    /// Chunker bounds
    pub chunking: ChunkingConfig,
    /// Logging output
    pub logging: LoggingConfig,
    /// Resilience profile overrides
    pub resilience: ResilienceConfig,
}

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Non-persistent, for tests and development
    Memory,
    /// JSON-lines files under the store root
    #[default]
    Filesystem,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind
    pub backend: StoreBackend,
    /// Root directory for the filesystem backend
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            root: PathBuf::from(DEFAULT_STORE_ROOT),
        }
    }
}

/// Embedding provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Deterministic offline hashing embedder
    #[default]
    Hashing,
    /// OpenAI-compatible HTTP endpoint
    OpenAi,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider kind
    pub provider: EmbeddingProviderKind,
    /// Vector dimension; must match the store contents
    pub dimensions: usize,
    /// Endpoint base URL (openai provider)
    pub base_url: String,
    /// API key (openai provider)
    pub api_key: String,
    /// Model name (openai provider)
    pub model: String,
    /// Request timeout in seconds (openai provider)
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            timeout_secs: 10,
        }
    }
}

/// LLM extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions base URL; empty selects the null extractor
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Lexicon cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Cache file path; absence of the file is an empty lexicon
    pub cache_path: PathBuf,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_LEXICON_CACHE),
        }
    }
}

/// Chunker bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Preferred minimum chunk length in characters
    pub min_chars: usize,
    /// Hard maximum chunk length in characters
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_chars: 500,
            max_chars: 1500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
    /// Optional log file; rotated daily
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Optional per-profile resilience overrides
///
/// Unset fields keep the contract values from the profile table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
    /// Timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Retry attempts, including the first call
    pub retry_attempts: Option<u32>,
    /// Consecutive failures before the circuit opens
    pub failure_threshold: Option<u32>,
    /// Milliseconds the circuit stays open
    pub open_timeout_ms: Option<u64>,
    /// Half-open successes required to close
    pub success_threshold: Option<u32>,
    /// Bulkhead concurrency
    pub max_concurrent: Option<usize>,
    /// Bulkhead queue length
    pub max_queue: Option<usize>,
}

impl ProfileOverrides {
    /// Apply the overrides to a base profile
    pub fn apply(&self, mut profile: ResilienceProfile) -> ResilienceProfile {
        if let Some(ms) = self.timeout_ms {
            profile.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.retry_attempts {
            profile.retry.max_attempts = attempts;
        }
        if let Some(breaker) = profile.circuit_breaker.as_mut() {
            if let Some(threshold) = self.failure_threshold {
                breaker.failure_threshold = threshold;
            }
            if let Some(ms) = self.open_timeout_ms {
                breaker.open_timeout = Duration::from_millis(ms);
            }
            if let Some(threshold) = self.success_threshold {
                breaker.success_threshold = threshold;
            }
        }
        if let Some(max) = self.max_concurrent {
            profile.bulkhead.max_concurrent = max;
        }
        if let Some(max) = self.max_queue {
            profile.bulkhead.max_queue = max;
        }
        profile
    }
}

/// Resilience profile overrides per dependency class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// LLM_API overrides
    pub llm_api: ProfileOverrides,
    /// EMBEDDING overrides
    pub embedding: ProfileOverrides,
    /// DATABASE overrides
    pub database: ProfileOverrides,
    /// SEARCH overrides
    pub search: ProfileOverrides,
}

impl ResilienceConfig {
    /// The effective LLM_API profile
    pub fn llm_api_profile(&self) -> ResilienceProfile {
        self.llm_api.apply(ResilienceProfile::llm_api())
    }

    /// The effective EMBEDDING profile
    pub fn embedding_profile(&self) -> ResilienceProfile {
        self.embedding.apply(ResilienceProfile::embedding())
    }

    /// The effective DATABASE profile
    pub fn database_profile(&self) -> ResilienceProfile {
        self.database.apply(ResilienceProfile::database())
    }

    /// The effective SEARCH profile
    pub fn search_profile(&self) -> ResilienceProfile {
        self.search.apply(ResilienceProfile::search())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_set_fields() {
        let overrides = ProfileOverrides {
            timeout_ms: Some(1_000),
            failure_threshold: Some(2),
            ..Default::default()
        };
        let profile = overrides.apply(ResilienceProfile::llm_api());
        assert_eq!(profile.timeout, Duration::from_millis(1_000));
        assert_eq!(profile.retry.max_attempts, 3);
        assert_eq!(profile.circuit_breaker.unwrap().failure_threshold, 2);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.embedding.dimensions, DEFAULT_EMBEDDING_DIMENSIONS);
        assert_eq!(parsed.store.backend, StoreBackend::Filesystem);
    }
}
