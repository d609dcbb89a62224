//! Bulkhead
//!
//! Per-operation concurrency isolation: up to `max_concurrent` calls run,
//! up to `max_queue` wait FIFO behind them, and everything beyond that is
//! rejected synchronously with a backpressure error. Slots are released on
//! success and failure alike.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use libris_domain::error::{Error, Result};

/// Bulkhead tuning
#[derive(Debug, Clone)]
pub struct BulkheadSettings {
    /// Calls allowed to run concurrently
    pub max_concurrent: usize,
    /// Calls allowed to wait for a slot
    pub max_queue: usize,
}

/// Point-in-time bulkhead metrics
#[derive(Debug, Clone, Serialize)]
pub struct BulkheadMetrics {
    /// Operation name
    pub name: String,
    /// Currently executing calls
    pub active: usize,
    /// Currently queued calls
    pub queued: usize,
    /// Calls admitted since creation
    pub total_calls: u64,
    /// Calls rejected since creation
    pub rejections: u64,
}

/// Per-operation concurrency limiter
pub struct Bulkhead {
    name: String,
    settings: BulkheadSettings,
    semaphore: Arc<Semaphore>,
    queued: AtomicUsize,
    total_calls: AtomicU64,
    rejections: AtomicU64,
}

impl Bulkhead {
    /// Create a bulkhead for one operation name
    pub fn new(name: impl Into<String>, settings: BulkheadSettings) -> Self {
        let semaphore = Arc::new(Semaphore::new(settings.max_concurrent));
        Self {
            name: name.into(),
            settings,
            semaphore,
            queued: AtomicUsize::new(0),
            total_calls: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    /// Run an operation inside the bulkhead
    pub async fn execute<T, Fut>(&self, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let permit = match self.semaphore.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                // No free slot; join the queue unless it is already full.
                let waiting = self.queued.fetch_add(1, Ordering::SeqCst);
                if waiting >= self.settings.max_queue {
                    self.queued.fetch_sub(1, Ordering::SeqCst);
                    self.rejections.fetch_add(1, Ordering::Relaxed);
                    return Err(Error::bulkhead_full(
                        self.name.clone(),
                        self.settings.max_concurrent,
                        self.settings.max_queue,
                    ));
                }
                let permit = self.semaphore.acquire().await.map_err(|_| {
                    Error::internal(format!("bulkhead '{}' semaphore closed", self.name))
                });
                self.queued.fetch_sub(1, Ordering::SeqCst);
                permit?
            }
        };

        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let result = fut.await;
        drop(permit);
        result
    }

    /// Whether both the slots and the queue are exhausted
    pub fn is_full(&self) -> bool {
        self.semaphore.available_permits() == 0
            && self.queued.load(Ordering::SeqCst) >= self.settings.max_queue
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point-in-time metrics
    pub fn metrics(&self) -> BulkheadMetrics {
        BulkheadMetrics {
            name: self.name.clone(),
            active: self
                .settings
                .max_concurrent
                .saturating_sub(self.semaphore.available_permits()),
            queued: self.queued.load(Ordering::SeqCst),
            total_calls: self.total_calls.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn bulkhead(max_concurrent: usize, max_queue: usize) -> Arc<Bulkhead> {
        Arc::new(Bulkhead::new(
            "op",
            BulkheadSettings {
                max_concurrent,
                max_queue,
            },
        ))
    }

    #[tokio::test]
    async fn admits_up_to_capacity_plus_queue_and_rejects_beyond() {
        let bulkhead = bulkhead(2, 2);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let bh = Arc::clone(&bulkhead);
            handles.push(tokio::spawn(async move {
                bh.execute(async {
                    // Block forever.
                    std::future::pending::<()>().await;
                    Ok(())
                })
                .await
            }));
        }

        // Let the four calls reach their slots and queue positions.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let metrics = bulkhead.metrics();
        assert_eq!(metrics.active, 2);
        assert_eq!(metrics.queued, 2);
        assert!(bulkhead.is_full());

        // The fifth call is rejected synchronously.
        let result = bulkhead.execute(async { Ok(()) }).await;
        assert!(matches!(result.unwrap_err(), Error::BulkheadFull { .. }));
        assert_eq!(bulkhead.metrics().rejections, 1);

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn releases_slots_on_failure() {
        let bulkhead = bulkhead(1, 0);
        let result: Result<()> = bulkhead
            .execute(async { Err(Error::internal("boom")) })
            .await;
        assert!(result.is_err());
        // The slot is free again.
        let ok = bulkhead.execute(async { Ok(1) }).await.unwrap();
        assert_eq!(ok, 1);
    }
}
