//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Libris retrieval engine
///
/// Variants map to the error taxonomy of the system: validation errors are
/// surfaced verbatim and never retried; transient infrastructure errors are
/// retried per resilience profile; `CircuitOpen` and `BulkheadFull` are
/// fast-fail signals produced by the resilience layer itself.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool input outside the schema (empty text, limit out of range)
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description returned to the caller
        message: String,
    },

    /// Resource genuinely missing where the contract requires it to exist
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// An operation exceeded its resilience-profile timeout
    #[error("Operation '{operation}' timed out after {millis}ms")]
    Timeout {
        /// Name of the timed-out operation
        operation: String,
        /// Configured timeout in milliseconds
        millis: u64,
    },

    /// Fast-fail: the named dependency's circuit breaker is open
    #[error("Circuit breaker open for '{operation}'")]
    CircuitOpen {
        /// Operation name whose breaker rejected the call
        operation: String,
    },

    /// Backpressure: the named bulkhead has no slot and a full queue
    #[error("Bulkhead full for '{operation}' (max concurrent {max_concurrent}, queue {max_queue})")]
    BulkheadFull {
        /// Operation name whose bulkhead rejected the call
        operation: String,
        /// Configured concurrency limit
        max_concurrent: usize,
        /// Configured queue limit
        max_queue: usize,
    },

    /// Retries exhausted against a transient dependency failure
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Description of the exhausted operation
        message: String,
    },

    /// Vector store operation error
    #[error("Vector store error: {message}")]
    VectorDb {
        /// Description of the vector store error
        message: String,
    },

    /// Embedding provider operation error
    #[error("Embedding provider error: {message}")]
    Embedding {
        /// Description of the embedding error
        message: String,
    },

    /// Concept extraction provider error
    #[error("Concept extraction error: {message}")]
    Extraction {
        /// Description of the extraction error
        message: String,
    },

    /// Lexical ontology lookup error
    #[error("Lexicon error: {message}")]
    Lexicon {
        /// Description of the lexicon error
        message: String,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, millis: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            millis,
        }
    }

    /// Create a circuit-open error
    pub fn circuit_open<S: Into<String>>(operation: S) -> Self {
        Self::CircuitOpen {
            operation: operation.into(),
        }
    }

    /// Create a bulkhead-full error
    pub fn bulkhead_full<S: Into<String>>(
        operation: S,
        max_concurrent: usize,
        max_queue: usize,
    ) -> Self {
        Self::BulkheadFull {
            operation: operation.into(),
            max_concurrent,
            max_queue,
        }
    }

    /// Create a service-unavailable error
    pub fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create a vector store error
    pub fn vector_db<S: Into<String>>(message: S) -> Self {
        Self::VectorDb {
            message: message.into(),
        }
    }

    /// Create an embedding provider error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a concept extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create a lexicon error
    pub fn lexicon<S: Into<String>>(message: S) -> Self {
        Self::Lexicon {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a retry can plausibly succeed
    ///
    /// Only transient infrastructure failures qualify. Validation errors,
    /// fast-fail resilience signals and invariant violations are permanent
    /// for a given call.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::VectorDb { .. }
                | Self::Embedding { .. }
                | Self::Extraction { .. }
                | Self::Lexicon { .. }
                | Self::Io { .. }
                | Self::ServiceUnavailable { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::timeout("embed", 10_000).is_transient());
        assert!(Error::vector_db("connection reset").is_transient());
        assert!(!Error::validation("empty query").is_transient());
        assert!(!Error::circuit_open("llm.extract").is_transient());
        assert!(!Error::bulkhead_full("llm.extract", 5, 10).is_transient());
    }

    #[test]
    fn display_includes_operation_name() {
        let err = Error::timeout("llm.extract", 30_000);
        assert!(err.to_string().contains("llm.extract"));
        assert!(err.to_string().contains("30000"));
    }
}
