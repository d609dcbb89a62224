//! Operation timeout
//!
//! Races an operation against a timer. The underlying future is dropped on
//! expiry, not cancelled remotely: a timed-out HTTP call may still complete
//! on the wire, but its result is discarded.

use std::future::Future;
use std::time::Duration;

use libris_domain::error::{Error, Result};

/// Run an operation with a deadline
pub async fn with_timeout<T>(
    operation: &str,
    duration: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_before_deadline() {
        let result = with_timeout("op", Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn elapses_into_timeout_error() {
        let result: Result<()> = with_timeout("slow.op", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        match result.unwrap_err() {
            Error::Timeout { operation, millis } => {
                assert_eq!(operation, "slow.op");
                assert_eq!(millis, 50);
            }
            other => panic!("expected timeout, got {}", other),
        }
    }
}
