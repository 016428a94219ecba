//! Bulkhead concurrency limiter, named, with an explicit bounded FIFO queue
//! (`crossbeam_queue::ArrayQueue`) fronting a `tokio::Semaphore` so
//! queue-depth rejection is a real, inspectable structure rather than an
//! implicit waiter count.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;
use dashmap::DashMap;
use tokio::sync::Semaphore;

use crate::error::PreprocessError;

#[derive(Debug, Clone, Copy)]
pub struct BulkheadConfig {
    pub max_parallel: usize,
    pub max_queued: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self { max_parallel: 10, max_queued: 20 }
    }
}

struct Bulkhead {
    semaphore: Arc<Semaphore>,
    queue_tokens: Arc<ArrayQueue<()>>,
    max_parallel: usize,
}

/// Per-name bulkhead registry: atomic increment/decrement over a bounded,
/// FIFO-fair queue.
pub struct BulkheadRegistry {
    named: DashMap<String, Arc<Bulkhead>>,
}

impl Default for BulkheadRegistry {
    fn default() -> Self {
        Self { named: DashMap::new() }
    }
}

impl BulkheadRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&self, name: &str, cfg: &BulkheadConfig) -> Arc<Bulkhead> {
        self.named
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Bulkhead {
                    semaphore: Arc::new(Semaphore::new(cfg.max_parallel)),
                    queue_tokens: Arc::new(ArrayQueue::new(cfg.max_queued.max(1))),
                    max_parallel: cfg.max_parallel,
                })
            })
            .clone()
    }

    /// Running/`max_parallel` utilization for `name`, 0.0 if unseen.
    #[must_use]
    pub fn utilization(&self, name: &str) -> f64 {
        self.named
            .get(name)
            .map(|b| {
                let available = b.semaphore.available_permits();
                let running = b.max_parallel.saturating_sub(available);
                running as f64 / b.max_parallel.max(1) as f64
            })
            .unwrap_or(0.0)
    }
}

static QUEUE_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Execute `op` under a named bulkhead. Rejects immediately once both the
/// running slots and the queue are full.
pub async fn run_bulkhead<T, F, Fut>(
    registry: &BulkheadRegistry,
    name: &str,
    cfg: &BulkheadConfig,
    op: F,
) -> Result<T, PreprocessError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PreprocessError>>,
{
    let bulkhead = registry.get_or_create(name, cfg);

    if bulkhead.semaphore.available_permits() == 0 {
        // Would queue: reserve a FIFO slot or reject outright.
        if bulkhead.queue_tokens.push(()).is_err() {
            return Err(PreprocessError::BulkheadRejected { policy_name: name.to_string() });
        }
        let _ = QUEUE_DEPTH.fetch_add(1, Ordering::Relaxed);
        let permit = bulkhead
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");
        bulkhead.queue_tokens.pop();
        let _ = QUEUE_DEPTH.fetch_sub(1, Ordering::Relaxed);
        let result = op().await;
        drop(permit);
        result
    } else {
        let permit = bulkhead
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");
        let result = op().await;
        drop(permit);
        result
    }
}
