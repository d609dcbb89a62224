//! Resilience layer
//!
//! Four composable primitives (timeout, circuit breaker, bulkhead, retry)
//! plus graceful degradation, composed by [`ResilientExecutor`] in the order
//! bulkhead → circuit breaker → timeout → retry. Breaker and bulkhead state
//! is memoized per operation name inside the executor, which lives once in
//! the application container.

mod adapters;
mod bulkhead;
mod circuit_breaker;
mod degradation;
mod executor;
mod retry;
mod timeout;

pub use adapters::{
    ResilientCatalogRepository, ResilientCategoryRepository, ResilientChunkRepository,
    ResilientConceptExtractor, ResilientConceptRepository, ResilientEmbeddingProvider,
};
pub use bulkhead::{Bulkhead, BulkheadMetrics, BulkheadSettings};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerMetrics, CircuitBreakerSettings, CircuitState,
};
pub use degradation::GracefulDegradation;
pub use executor::{HealthSummary, ResilienceProfile, ResilientExecutor};
pub use retry::RetryPolicy;
pub use timeout::with_timeout;
