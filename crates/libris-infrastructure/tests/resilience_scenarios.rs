//! Resilience scenarios over the composed executor
//!
//! Drives the executor the way the ingestion pipeline and the search path
//! do, with a simulated clock for the breaker's recovery window.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use libris_domain::error::{Error, Result};
use libris_infrastructure::resilience::{
    Bulkhead, BulkheadSettings, ResilienceProfile, ResilientExecutor, RetryPolicy,
};

fn llm_profile_without_backoff() -> ResilienceProfile {
    let mut profile = ResilienceProfile::llm_api();
    // Single attempt per call so each executor call maps to one failure.
    profile.retry = RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
        multiplier: 2.0,
        max_delay: Duration::from_millis(2),
    };
    profile
}

#[tokio::test(start_paused = true)]
async fn llm_breaker_opens_fast_fails_and_recovers() {
    let executor = ResilientExecutor::new();
    let profile = llm_profile_without_backoff();
    let calls = AtomicU32::new(0);

    // Five consecutive failures trip the breaker.
    for _ in 0..5 {
        let result: Result<()> = executor
            .execute("llm.extract", &profile, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::extraction("llm down")) }
            })
            .await;
        assert!(result.is_err());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    // The sixth call fast-fails without reaching the operation.
    let result: Result<()> = executor
        .execute("llm.extract", &profile, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
    assert!(matches!(result.unwrap_err(), Error::CircuitOpen { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    // After the 60 s open window a probe is admitted and succeeds.
    tokio::time::advance(Duration::from_secs(61)).await;
    let result: Result<()> = executor
        .execute("llm.extract", &profile, || async { Ok(()) })
        .await;
    assert!(result.is_ok());
    assert!(!executor
        .health_summary()
        .open_circuits
        .contains(&"llm.extract".to_string()));

    // A second half-open success closes the breaker fully.
    let result: Result<()> = executor
        .execute("llm.extract", &profile, || async { Ok(()) })
        .await;
    assert!(result.is_ok());
    assert!(!executor.is_circuit_open("llm.extract"));
    assert!(executor.health_summary().healthy);
}

#[tokio::test]
async fn bulkhead_admits_capacity_plus_queue() {
    let bulkhead = std::sync::Arc::new(Bulkhead::new(
        "llm.extract",
        BulkheadSettings {
            max_concurrent: 2,
            max_queue: 2,
        },
    ));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let bh = std::sync::Arc::clone(&bulkhead);
        handles.push(tokio::spawn(async move {
            bh.execute(async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await
        }));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Calls 1-2 run, 3-4 queue, the fifth rejects synchronously.
    let metrics = bulkhead.metrics();
    assert_eq!(metrics.active, 2);
    assert_eq!(metrics.queued, 2);
    let result = bulkhead.execute(async { Ok(()) }).await;
    match result.unwrap_err() {
        Error::BulkheadFull {
            operation,
            max_concurrent,
            max_queue,
        } => {
            assert_eq!(operation, "llm.extract");
            assert_eq!(max_concurrent, 2);
            assert_eq!(max_queue, 2);
        }
        other => panic!("expected BulkheadFull, got {}", other),
    }

    for handle in handles {
        handle.abort();
    }
}
