//! Exponential-backoff retry
//!
//! Retries transient failures with exponential backoff and jitter. Permanent
//! errors (validation, fast-fail resilience signals) propagate immediately;
//! exhausting the attempts surfaces a service-unavailable error naming the
//! operation.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use libris_domain::error::{Error, Result};

use crate::constants::{
    DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_DELAY, DEFAULT_RETRY_MULTIPLIER,
};

/// Retry tuning
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Backoff multiplier between attempts
    pub multiplier: f64,
    /// Upper bound on a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            multiplier: DEFAULT_RETRY_MULTIPLIER,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy with a fixed attempt count and the default backoff shape
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Run an operation with retries
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    warn!(
                        operation = %operation,
                        attempt,
                        error = %err,
                        "transient failure"
                    );
                    last_error = Some(err);
                    if attempt < attempts {
                        tokio::time::sleep(self.delay_for(attempt)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let last = last_error.expect("at least one attempt ran");
        Err(Error::service_unavailable(format!(
            "'{}' failed after {} attempts: {}",
            operation, attempts, last
        )))
    }

    /// Backoff before the attempt following `attempt` (1-based), with jitter
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let base = self.base_delay.as_secs_f64() * factor;
        let jitter = 1.0 + rand::rng().random_range(0.0..0.25);
        Duration::from_secs_f64((base * jitter).min(self.max_delay.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: attempts,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .execute("op", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::embedding("transient"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_service_unavailable() {
        let result: Result<()> = fast_policy(2)
            .execute("llm.extract", || async {
                Err(Error::timeout("llm.extract", 10))
            })
            .await;
        match result.unwrap_err() {
            Error::ServiceUnavailable { message } => {
                assert!(message.contains("llm.extract"));
                assert!(message.contains("2 attempts"));
            }
            other => panic!("expected ServiceUnavailable, got {}", other),
        }
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast_policy(3)
            .execute("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::validation("bad input")) }
            })
            .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delays_grow_and_stay_bounded() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_millis(350),
        };
        let first = policy.delay_for(1);
        let second = policy.delay_for(2);
        assert!(first >= Duration::from_millis(100));
        assert!(second > first);
        assert!(policy.delay_for(4) <= Duration::from_millis(350));
    }
}
