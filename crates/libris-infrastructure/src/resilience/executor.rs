//! Resilient executor
//!
//! Composes the primitives in the order bulkhead → circuit breaker →
//! timeout → retry (innermost) and memoizes breaker and bulkhead state by
//! operation name, so every call site naming the same operation shares one
//! failure domain. Profiles carry the contract values for the four
//! dependency classes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

use libris_domain::error::Result;

use super::bulkhead::{Bulkhead, BulkheadSettings};
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerSettings};
use super::retry::RetryPolicy;
use super::timeout::with_timeout;
use crate::constants::*;

/// Tuning for one dependency class
#[derive(Debug, Clone)]
pub struct ResilienceProfile {
    /// Profile name, used in logs
    pub name: &'static str,
    /// Timeout around the whole retry sequence
    pub timeout: Duration,
    /// Retry policy (innermost layer)
    pub retry: RetryPolicy,
    /// Breaker settings; `None` disables the breaker for this class
    pub circuit_breaker: Option<CircuitBreakerSettings>,
    /// Bulkhead settings
    pub bulkhead: BulkheadSettings,
}

impl ResilienceProfile {
    /// LLM_API: 30 s timeout, 3 attempts, breaker 5 → 60 s, bulkhead 5/10
    pub fn llm_api() -> Self {
        Self {
            name: "llm_api",
            timeout: LLM_API_TIMEOUT,
            retry: RetryPolicy::with_attempts(LLM_API_RETRY_ATTEMPTS),
            circuit_breaker: Some(CircuitBreakerSettings {
                failure_threshold: LLM_API_FAILURE_THRESHOLD,
                open_timeout: LLM_API_OPEN_TIMEOUT,
                success_threshold: DEFAULT_SUCCESS_THRESHOLD,
                reset_timeout: DEFAULT_RESET_TIMEOUT,
            }),
            bulkhead: BulkheadSettings {
                max_concurrent: LLM_API_MAX_CONCURRENT,
                max_queue: LLM_API_MAX_QUEUE,
            },
        }
    }

    /// EMBEDDING: 10 s timeout, 3 attempts, breaker 5 → 30 s, bulkhead 10/20
    pub fn embedding() -> Self {
        Self {
            name: "embedding",
            timeout: EMBEDDING_TIMEOUT,
            retry: RetryPolicy::with_attempts(EMBEDDING_RETRY_ATTEMPTS),
            circuit_breaker: Some(CircuitBreakerSettings {
                failure_threshold: EMBEDDING_FAILURE_THRESHOLD,
                open_timeout: EMBEDDING_OPEN_TIMEOUT,
                success_threshold: DEFAULT_SUCCESS_THRESHOLD,
                reset_timeout: DEFAULT_RESET_TIMEOUT,
            }),
            bulkhead: BulkheadSettings {
                max_concurrent: EMBEDDING_MAX_CONCURRENT,
                max_queue: EMBEDDING_MAX_QUEUE,
            },
        }
    }

    /// DATABASE: 3 s timeout, 2 attempts, no breaker, bulkhead 20/50
    pub fn database() -> Self {
        Self {
            name: "database",
            timeout: DATABASE_TIMEOUT,
            retry: RetryPolicy::with_attempts(DATABASE_RETRY_ATTEMPTS),
            circuit_breaker: None,
            bulkhead: BulkheadSettings {
                max_concurrent: DATABASE_MAX_CONCURRENT,
                max_queue: DATABASE_MAX_QUEUE,
            },
        }
    }

    /// SEARCH: 5 s timeout, 2 attempts, no breaker, bulkhead 15/30
    pub fn search() -> Self {
        Self {
            name: "search",
            timeout: SEARCH_TIMEOUT,
            retry: RetryPolicy::with_attempts(SEARCH_RETRY_ATTEMPTS),
            circuit_breaker: None,
            bulkhead: BulkheadSettings {
                max_concurrent: SEARCH_MAX_CONCURRENT,
                max_queue: SEARCH_MAX_QUEUE,
            },
        }
    }
}

/// Aggregated health view over all memoized state
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    /// True when no circuit is open and no bulkhead is saturated
    pub healthy: bool,
    /// Operation names with an open circuit
    pub open_circuits: Vec<String>,
    /// Operation names with exhausted slots and queue
    pub full_bulkheads: Vec<String>,
}

/// Composes the resilience primitives per operation name
pub struct ResilientExecutor {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    bulkheads: DashMap<String, Arc<Bulkhead>>,
}

impl ResilientExecutor {
    /// Create an executor with no memoized state
    pub fn new() -> Self {
        Self {
            breakers: DashMap::new(),
            bulkheads: DashMap::new(),
        }
    }

    /// The memoized breaker for an operation, created on first use
    pub fn breaker(&self, operation: &str, settings: &CircuitBreakerSettings) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(operation.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(operation, settings.clone())))
            .clone()
    }

    /// The memoized bulkhead for an operation, created on first use
    pub fn bulkhead(&self, operation: &str, settings: &BulkheadSettings) -> Arc<Bulkhead> {
        self.bulkheads
            .entry(operation.to_string())
            .or_insert_with(|| Arc::new(Bulkhead::new(operation, settings.clone())))
            .clone()
    }

    /// Whether an operation's circuit is currently open
    pub fn is_circuit_open(&self, operation: &str) -> bool {
        self.breakers
            .get(operation)
            .map(|b| b.is_open())
            .unwrap_or(false)
    }

    /// Run an operation under a profile
    ///
    /// The closure is invoked once per retry attempt. Composition order:
    /// the bulkhead admits the call, the breaker may fast-fail it, the
    /// timeout bounds the whole retry sequence, and the retry policy drives
    /// the individual attempts.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        profile: &ResilienceProfile,
        op: F,
    ) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let bulkhead = self.bulkhead(operation, &profile.bulkhead);
        let breaker = profile
            .circuit_breaker
            .as_ref()
            .map(|settings| self.breaker(operation, settings));

        bulkhead
            .execute(async {
                if let Some(breaker) = &breaker {
                    breaker.try_acquire()?;
                }
                let result = with_timeout(
                    operation,
                    profile.timeout,
                    profile.retry.execute(operation, || op()),
                )
                .await;
                if let Some(breaker) = &breaker {
                    match &result {
                        Ok(_) => breaker.record_success(),
                        Err(_) => breaker.record_failure(),
                    }
                }
                result
            })
            .await
    }

    /// Aggregated health of all memoized breakers and bulkheads
    pub fn health_summary(&self) -> HealthSummary {
        let open_circuits: Vec<String> = self
            .breakers
            .iter()
            .filter(|entry| entry.value().is_open())
            .map(|entry| entry.key().clone())
            .collect();
        let full_bulkheads: Vec<String> = self
            .bulkheads
            .iter()
            .filter(|entry| entry.value().is_full())
            .map(|entry| entry.key().clone())
            .collect();
        HealthSummary {
            healthy: open_circuits.is_empty() && full_bulkheads.is_empty(),
            open_circuits,
            full_bulkheads,
        }
    }
}

impl Default for ResilientExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_domain::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn failing_profile() -> ResilienceProfile {
        ResilienceProfile {
            name: "llm_api",
            timeout: Duration::from_secs(30),
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
                multiplier: 2.0,
                max_delay: Duration::from_millis(2),
            },
            ..ResilienceProfile::llm_api()
        }
    }

    #[tokio::test]
    async fn breaker_state_is_shared_across_calls_with_one_name() {
        let executor = ResilientExecutor::new();
        let profile = failing_profile();

        for _ in 0..5 {
            let result: Result<()> = executor
                .execute("llm.extract", &profile, || async {
                    Err(Error::extraction("down"))
                })
                .await;
            assert!(result.is_err());
        }

        // Sixth call is rejected synchronously by the open breaker.
        let start = Instant::now();
        let result: Result<()> = executor
            .execute("llm.extract", &profile, || async { Ok(()) })
            .await;
        assert!(matches!(result.unwrap_err(), Error::CircuitOpen { .. }));
        assert!(start.elapsed() < Duration::from_millis(10));
        assert!(executor.is_circuit_open("llm.extract"));

        let health = executor.health_summary();
        assert!(!health.healthy);
        assert_eq!(health.open_circuits, vec!["llm.extract".to_string()]);
    }

    #[tokio::test]
    async fn retry_runs_inside_the_executor() {
        let executor = ResilientExecutor::new();
        let mut profile = ResilienceProfile::database();
        profile.retry = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
            max_delay: Duration::from_millis(2),
        };

        let calls = AtomicU32::new(0);
        let result = executor
            .execute("db.read", &profile, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(Error::vector_db("transient"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn profiles_carry_contract_values() {
        let llm = ResilienceProfile::llm_api();
        assert_eq!(llm.timeout, Duration::from_secs(30));
        assert_eq!(llm.retry.max_attempts, 3);
        let cb = llm.circuit_breaker.unwrap();
        assert_eq!(cb.failure_threshold, 5);
        assert_eq!(cb.open_timeout, Duration::from_secs(60));
        assert_eq!(llm.bulkhead.max_concurrent, 5);
        assert_eq!(llm.bulkhead.max_queue, 10);

        assert!(ResilienceProfile::database().circuit_breaker.is_none());
        assert!(ResilienceProfile::search().circuit_breaker.is_none());
        assert_eq!(ResilienceProfile::embedding().timeout, Duration::from_secs(10));
    }
}
