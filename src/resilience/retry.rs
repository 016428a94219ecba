//! Retry primitive.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::PreprocessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    Fixed,
    Linear,
    Exponential,
}

/// Predicate deciding whether an error should be retried. Defaults to
/// `PreprocessError::is_retryable`.
pub type RetryPredicate = Arc<dyn Fn(&PreprocessError) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub strategy: RetryStrategy,
    pub use_jitter: bool,
    pub predicate: RetryPredicate,
}

impl std::fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("strategy", &self.strategy)
            .field("use_jitter", &self.use_jitter)
            .finish_non_exhaustive()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            strategy: RetryStrategy::Exponential,
            use_jitter: true,
            predicate: Arc::new(PreprocessError::is_retryable),
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `k` (1-indexed: the wait before the k-th retry).
    #[must_use]
    pub fn delay_for(&self, k: u32) -> Duration {
        let jitter = if self.use_jitter {
            let max_jitter_nanos = self.base_delay.as_nanos().max(1) as u64;
            Duration::from_nanos(rand::rng().random_range(0..max_jitter_nanos))
        } else {
            Duration::ZERO
        };

        let raw = match self.strategy {
            RetryStrategy::Fixed => self.base_delay,
            RetryStrategy::Linear => {
                let scaled = self.base_delay.saturating_mul(k);
                (scaled + jitter).min(self.max_delay)
            }
            RetryStrategy::Exponential => {
                let exp = 2u32.saturating_pow(k.saturating_sub(1));
                let scaled = self.base_delay.saturating_mul(exp);
                (scaled + jitter).min(self.max_delay)
            }
        };

        if self.strategy == RetryStrategy::Fixed {
            raw
        } else {
            raw.min(self.max_delay)
        }
    }
}

/// Run `op` under the retry policy. `op` is re-invoked fresh on each
/// attempt; non-retryable errors (per `predicate`) propagate immediately.
pub async fn run_retry<T, F, Fut>(cfg: &RetryConfig, mut op: F) -> Result<T, PreprocessError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, PreprocessError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= cfg.max_attempts || !(cfg.predicate)(&err) {
                    return Err(err);
                }
                let delay = cfg.delay_for(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn s4_retry_success_scenario() {
        let calls = AtomicU32::new(0);
        let cfg = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            strategy: RetryStrategy::Fixed,
            use_jitter: false,
            predicate: Arc::new(|_| true),
        };

        let start = std::time::Instant::now();
        let result: Result<&str, PreprocessError> = run_retry(&cfg, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PreprocessError::Network("boom".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn non_retryable_error_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let cfg = RetryConfig::default();
        let result: Result<(), PreprocessError> = run_retry(&cfg, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PreprocessError::Validation("bad".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exponential_backoff_doubles() {
        let cfg = RetryConfig {
            use_jitter: false,
            strategy: RetryStrategy::Exponential,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(10),
            ..RetryConfig::default()
        };
        assert_eq!(cfg.delay_for(1), Duration::from_millis(10));
        assert_eq!(cfg.delay_for(2), Duration::from_millis(20));
        assert_eq!(cfg.delay_for(3), Duration::from_millis(40));
    }
}
