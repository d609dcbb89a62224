//! Infrastructure defaults
//!
//! The resilience profile values are part of the public contract; deviations
//! require an explicit configuration override.

use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "LIBRIS";
/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "libris.toml";
/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "libris";
/// Environment variable consulted for the log filter
pub const LOG_FILTER_ENV: &str = "LIBRIS_LOG";

/// Default embedding dimension (hashing embedder)
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
/// Default store root directory
pub const DEFAULT_STORE_ROOT: &str = "./data/store";
/// Default lexicon cache path
pub const DEFAULT_LEXICON_CACHE: &str = "./data/lexicon.json";

/// LLM_API profile: request timeout
pub const LLM_API_TIMEOUT: Duration = Duration::from_secs(30);
/// LLM_API profile: retry attempts
pub const LLM_API_RETRY_ATTEMPTS: u32 = 3;
/// LLM_API profile: consecutive failures before the circuit opens
pub const LLM_API_FAILURE_THRESHOLD: u32 = 5;
/// LLM_API profile: how long the circuit stays open
pub const LLM_API_OPEN_TIMEOUT: Duration = Duration::from_secs(60);
/// LLM_API profile: bulkhead concurrency
pub const LLM_API_MAX_CONCURRENT: usize = 5;
/// LLM_API profile: bulkhead queue
pub const LLM_API_MAX_QUEUE: usize = 10;

/// EMBEDDING profile: request timeout
pub const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);
/// EMBEDDING profile: retry attempts
pub const EMBEDDING_RETRY_ATTEMPTS: u32 = 3;
/// EMBEDDING profile: consecutive failures before the circuit opens
pub const EMBEDDING_FAILURE_THRESHOLD: u32 = 5;
/// EMBEDDING profile: how long the circuit stays open
pub const EMBEDDING_OPEN_TIMEOUT: Duration = Duration::from_secs(30);
/// EMBEDDING profile: bulkhead concurrency
pub const EMBEDDING_MAX_CONCURRENT: usize = 10;
/// EMBEDDING profile: bulkhead queue
pub const EMBEDDING_MAX_QUEUE: usize = 20;

/// DATABASE profile: request timeout
pub const DATABASE_TIMEOUT: Duration = Duration::from_secs(3);
/// DATABASE profile: retry attempts
pub const DATABASE_RETRY_ATTEMPTS: u32 = 2;
/// DATABASE profile: bulkhead concurrency
pub const DATABASE_MAX_CONCURRENT: usize = 20;
/// DATABASE profile: bulkhead queue
pub const DATABASE_MAX_QUEUE: usize = 50;

/// SEARCH profile: request timeout
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
/// SEARCH profile: retry attempts
pub const SEARCH_RETRY_ATTEMPTS: u32 = 2;
/// SEARCH profile: bulkhead concurrency
pub const SEARCH_MAX_CONCURRENT: usize = 15;
/// SEARCH profile: bulkhead queue
pub const SEARCH_MAX_QUEUE: usize = 30;

/// Half-open successes required to close a circuit
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;
/// Inactivity after which a closed circuit's failure count decays
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(120);
/// Base delay of the exponential backoff
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
/// Backoff multiplier between attempts
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;
/// Upper bound on a single backoff delay
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);
