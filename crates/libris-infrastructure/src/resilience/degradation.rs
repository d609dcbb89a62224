//! Graceful degradation
//!
//! Routes around an unhealthy primary: the fallback answers when the health
//! predicate says to degrade (typically a breaker being open) or when the
//! primary fails. Fallback output is a valid, reduced answer - an empty
//! extraction, an empty result set, a stale cache entry.

use std::future::Future;

use tracing::warn;

use libris_domain::error::Result;

/// Primary/fallback composition
pub struct GracefulDegradation;

impl GracefulDegradation {
    /// Run the primary unless degraded, falling back on failure
    pub async fn execute<T, P, PF, F, FF>(
        operation: &str,
        should_degrade: impl Fn() -> bool,
        primary: P,
        fallback: F,
    ) -> Result<T>
    where
        P: FnOnce() -> PF,
        PF: Future<Output = Result<T>>,
        F: FnOnce() -> FF,
        FF: Future<Output = Result<T>>,
    {
        if should_degrade() {
            warn!(operation = %operation, "degraded before call; using fallback");
            return fallback().await;
        }
        match primary().await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(operation = %operation, error = %err, "primary failed; using fallback");
                fallback().await
            }
        }
    }

    /// Degrade to the type's default value
    pub async fn or_default<T, P, PF>(
        operation: &str,
        should_degrade: impl Fn() -> bool,
        primary: P,
    ) -> Result<T>
    where
        T: Default,
        P: FnOnce() -> PF,
        PF: Future<Output = Result<T>>,
    {
        Self::execute(operation, should_degrade, primary, || async {
            Ok(T::default())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_domain::error::Error;
    use libris_domain::value_objects::ExtractedConcepts;

    #[tokio::test]
    async fn healthy_primary_answers() {
        let result = GracefulDegradation::execute(
            "op",
            || false,
            || async { Ok(1) },
            || async { Ok(2) },
        )
        .await;
        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn open_circuit_skips_the_primary() {
        let result = GracefulDegradation::execute(
            "op",
            || true,
            || async { panic!("primary must not run") },
            || async { Ok(2) },
        )
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn failing_primary_falls_back_to_empty_extraction() {
        let result: Result<ExtractedConcepts> = GracefulDegradation::or_default(
            "llm.extract",
            || false,
            || async { Err(Error::service_unavailable("llm down")) },
        )
        .await;
        assert!(result.unwrap().is_empty());
    }
}
