//! Circuit breaker
//!
//! Per-operation state machine: CLOSED trips to OPEN after a run of
//! consecutive failures, OPEN fast-fails until the open timeout elapses,
//! then a HALF_OPEN probe either closes the circuit after enough successes
//! or re-opens it on any failure. An inactivity window in CLOSED decays the
//! failure run so sporadic errors spread over hours never trip the breaker.
//!
//! Clock reads go through `tokio::time::Instant` so tests can drive the
//! state machine with a paused runtime.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

use libris_domain::error::{Error, Result};

use crate::constants::{DEFAULT_RESET_TIMEOUT, DEFAULT_SUCCESS_THRESHOLD};

/// Circuit breaker tuning
#[derive(Debug, Clone)]
pub struct CircuitBreakerSettings {
    /// Consecutive failures that trip the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before probing
    pub open_timeout: Duration,
    /// Consecutive half-open successes required to close
    pub success_threshold: u32,
    /// Inactivity in CLOSED after which the failure run decays
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(60),
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow; failures are counted
    Closed,
    /// Calls fast-fail
    Open,
    /// Probe traffic decides the next state
    HalfOpen,
}

/// Point-in-time breaker metrics
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerMetrics {
    /// Operation name
    pub name: String,
    /// Current state
    pub state: CircuitState,
    /// Calls admitted since creation
    pub total_calls: u64,
    /// Failures recorded since creation
    pub total_failures: u64,
    /// Calls rejected while open
    pub rejected_calls: u64,
    /// Times the circuit has opened
    pub times_opened: u64,
    /// Current consecutive-failure run
    pub consecutive_failures: u32,
}

struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
    last_failure_at: Option<Instant>,
    total_calls: u64,
    total_failures: u64,
    rejected_calls: u64,
    times_opened: u64,
}

/// Per-operation circuit breaker
pub struct CircuitBreaker {
    name: String,
    settings: CircuitBreakerSettings,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a breaker for one operation name
    pub fn new(name: impl Into<String>, settings: CircuitBreakerSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
                last_failure_at: None,
                total_calls: 0,
                total_failures: 0,
                rejected_calls: 0,
                times_opened: 0,
            }),
        }
    }

    /// Admit or fast-fail a call
    ///
    /// Never blocks and never awaits: an OPEN circuit rejects synchronously.
    pub fn try_acquire(&self) -> Result<()> {
        let mut inner = self.state.lock().expect("breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.total_calls += 1;
                Ok(())
            }
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.settings.open_timeout)
                    .unwrap_or(true);
                if elapsed {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.total_calls += 1;
                    Ok(())
                } else {
                    inner.rejected_calls += 1;
                    Err(Error::circuit_open(self.name.clone()))
                }
            }
            CircuitState::HalfOpen => {
                inner.total_calls += 1;
                Ok(())
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let mut inner = self.state.lock().expect("breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.settings.success_threshold {
                    self.transition(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut inner = self.state.lock().expect("breaker lock poisoned");
        inner.total_failures += 1;
        match inner.state {
            CircuitState::Closed => {
                // Quiet periods decay the run before the new failure counts.
                if let Some(last) = inner.last_failure_at {
                    if last.elapsed() >= self.settings.reset_timeout {
                        inner.consecutive_failures = 0;
                    }
                }
                inner.last_failure_at = Some(Instant::now());
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.settings.failure_threshold {
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::Open => {}
        }
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.state.lock().expect("breaker lock poisoned").state
    }

    /// Whether calls are currently fast-failed
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point-in-time metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.state.lock().expect("breaker lock poisoned");
        CircuitBreakerMetrics {
            name: self.name.clone(),
            state: inner.state,
            total_calls: inner.total_calls,
            total_failures: inner.total_failures,
            rejected_calls: inner.rejected_calls,
            times_opened: inner.times_opened,
            consecutive_failures: inner.consecutive_failures,
        }
    }

    fn transition(&self, inner: &mut BreakerState, to: CircuitState) {
        if inner.state == to {
            return;
        }
        info!(
            circuit_breaker = %self.name,
            from = ?inner.state,
            to = ?to,
            "circuit breaker state transition"
        );
        inner.state = to;
        match to {
            CircuitState::Open => {
                inner.opened_at = Some(Instant::now());
                inner.times_opened += 1;
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes = 0;
            }
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
                inner.half_open_successes = 0;
                inner.opened_at = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CircuitBreakerSettings {
        CircuitBreakerSettings {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(60),
            success_threshold: 2,
            reset_timeout: Duration::from_secs(120),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn opens_after_consecutive_failures() {
        let breaker = CircuitBreaker::new("op", settings());
        for _ in 0..3 {
            breaker.try_acquire().unwrap();
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(matches!(
            breaker.try_acquire().unwrap_err(),
            Error::CircuitOpen { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_the_failure_run() {
        let breaker = CircuitBreaker::new("op", settings());
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_through_half_open() {
        let breaker = CircuitBreaker::new("op", settings());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(breaker.is_open());

        tokio::time::advance(Duration::from_secs(61)).await;
        breaker.try_acquire().unwrap();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_failure_reopens() {
        let breaker = CircuitBreaker::new("op", settings());
        for _ in 0..3 {
            breaker.record_failure();
        }
        tokio::time::advance(Duration::from_secs(61)).await;
        breaker.try_acquire().unwrap();
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_decays_the_failure_run() {
        let breaker = CircuitBreaker::new("op", settings());
        breaker.record_failure();
        breaker.record_failure();
        tokio::time::advance(Duration::from_secs(121)).await;
        breaker.record_failure();
        assert_eq!(breaker.metrics().consecutive_failures, 1);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
