//! Infrastructure layer for Libris
//!
//! Cross-cutting concerns around the retrieval engine: configuration
//! loading, structured logging, the resilience layer (timeout, circuit
//! breaker, bulkhead, retry, graceful degradation) and the application
//! container that wires providers into services. The container is the only
//! composition root in the system.

pub mod config;
pub mod constants;
pub mod container;
pub mod logging;
pub mod resilience;

pub use container::AppContainer;
