//! Resilience Engine: composes Retry, `CircuitBreaker`, Timeout and
//! Bulkhead into an explicit, ordered pipeline. Each primitive is kept as
//! its own standalone module, composed by the caller rather than fused
//! into one monolithic policy object.

pub mod bulkhead;
pub mod circuit_breaker;
pub mod retry;
pub mod stats;
pub mod timeout;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;

use crate::cancellation::CancellationSource;
use crate::error::PreprocessError;

pub use bulkhead::{BulkheadConfig, BulkheadRegistry};
pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState};
pub use retry::{RetryConfig, RetryPredicate, RetryStrategy};
pub use stats::{EventType, StatsBuffer};
pub use timeout::{TimeoutConfig, TimeoutStrategy};

/// One primitive in a composite policy.
#[derive(Clone)]
pub enum PolicyKind {
    Retry(RetryConfig),
    CircuitBreaker(CircuitBreakerConfig),
    Timeout(TimeoutConfig),
    Bulkhead(BulkheadConfig),
}

/// An ordered composition of primitives; `order[0]` is outermost (spec
/// §4.C: "a call flows P1 → P2 → … → operation → … → P2 → P1").
#[derive(Clone, Default)]
pub struct ResiliencePolicy {
    pub name: String,
    pub order: Vec<PolicyKind>,
}

impl ResiliencePolicy {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), order: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, kind: PolicyKind) -> Self {
        self.order.push(kind);
        self
    }

    /// Preset for outbound HTTP calls: retry on the HTTP-retryable error
    /// classes (connection, DNS, 5xx, 429, timeout), circuit-break per host,
    /// bound by an overall timeout — a scoped HTTP flavour of the policy.
    #[must_use]
    pub fn http_default(name: impl Into<String>) -> Self {
        Self::named(name)
            .with(PolicyKind::Retry(RetryConfig {
                predicate: Arc::new(PreprocessError::is_retryable),
                ..RetryConfig::default()
            }))
            .with(PolicyKind::CircuitBreaker(CircuitBreakerConfig::default()))
            .with(PolicyKind::Timeout(TimeoutConfig::default()))
    }
}

/// Shared, long-lived resilience state — the only long-lived shared object
/// in the pipeline. One instance is reused across pipeline runs.
pub struct ResilienceEngine {
    circuit_breakers: CircuitBreakerRegistry,
    bulkheads: BulkheadRegistry,
    stats: StatsBuffer,
}

impl Default for ResilienceEngine {
    fn default() -> Self {
        Self {
            circuit_breakers: CircuitBreakerRegistry::new(),
            bulkheads: BulkheadRegistry::new(),
            stats: StatsBuffer::new(),
        }
    }
}

impl ResilienceEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> &StatsBuffer {
        &self.stats
    }

    #[must_use]
    pub fn circuit_state(&self, name: &str) -> CircuitState {
        self.circuit_breakers.state(name)
    }

    #[must_use]
    pub fn bulkhead_utilization(&self, name: &str) -> f64 {
        self.bulkheads.utilization(name)
    }

    /// Execute `op` under `policy`, threading `cancel` through for any
    /// `Timeout` primitive's `Cooperative` strategy.
    pub async fn execute<T, F, Fut>(
        &self,
        policy: &ResiliencePolicy,
        cancel: &CancellationSource,
        op: F,
    ) -> Result<T, PreprocessError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, PreprocessError>> + Send,
        T: Send + 'static,
    {
        self.run_from(policy, 0, cancel, &op).await
    }

    fn run_from<'a, T, F, Fut>(
        &'a self,
        policy: &'a ResiliencePolicy,
        idx: usize,
        cancel: &'a CancellationSource,
        op: &'a F,
    ) -> BoxFuture<'a, Result<T, PreprocessError>>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, PreprocessError>> + Send,
        T: Send + 'a,
    {
        Box::pin(async move {
            let Some(kind) = policy.order.get(idx) else {
                return op().await;
            };

            let start = Instant::now();
            let result = match kind {
                PolicyKind::Retry(cfg) => {
                    retry::run_retry(cfg, || self.run_from(policy, idx + 1, cancel, op)).await
                }
                PolicyKind::CircuitBreaker(cfg) => {
                    circuit_breaker::run_circuit_breaker(&self.circuit_breakers, &policy.name, cfg, || {
                        self.run_from(policy, idx + 1, cancel, op)
                    })
                    .await
                }
                PolicyKind::Timeout(cfg) => {
                    timeout::run_timeout(cfg, cancel, self.run_from(policy, idx + 1, cancel, op)).await
                }
                PolicyKind::Bulkhead(cfg) => {
                    bulkhead::run_bulkhead(&self.bulkheads, &policy.name, cfg, || {
                        self.run_from(policy, idx + 1, cancel, op)
                    })
                    .await
                }
            };

            self.record(kind, &policy.name, &result, start.elapsed());
            result
        })
    }

    fn record<T>(
        &self,
        kind: &PolicyKind,
        name: &str,
        result: &Result<T, PreprocessError>,
        elapsed: Duration,
    ) {
        let event = match (kind, result) {
            (PolicyKind::CircuitBreaker(_), Err(PreprocessError::CircuitOpen { .. })) => {
                EventType::CircuitOpened
            }
            (PolicyKind::Bulkhead(_), Err(PreprocessError::BulkheadRejected { .. })) => {
                EventType::BulkheadRejected
            }
            (PolicyKind::Timeout(_), Err(PreprocessError::Timeout(_))) => EventType::Timeout,
            (_, Ok(_)) => EventType::Success,
            (_, Err(_)) => EventType::Failure,
        };
        self.stats.record(event, name, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::cancellation_pair;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn s6_retry_then_timeout_bounds_total_wall_time() {
        // [Timeout, Retry]: the outer timeout bounds total wall time
        // including retries (spec S6 / invariant 6).
        let engine = ResilienceEngine::new();
        let (source, _token) = cancellation_pair();
        let policy = ResiliencePolicy::named("svc")
            .with(PolicyKind::Timeout(TimeoutConfig {
                timeout: Duration::from_millis(30),
                strategy: TimeoutStrategy::Pessimistic,
            }))
            .with(PolicyKind::Retry(RetryConfig {
                max_attempts: 100,
                base_delay: Duration::from_millis(15),
                max_delay: Duration::from_millis(15),
                strategy: RetryStrategy::Fixed,
                use_jitter: false,
                predicate: Arc::new(|_| true),
            }));

        let start = Instant::now();
        let result: Result<(), PreprocessError> = engine
            .execute(&policy, &source, || async { Err(PreprocessError::Network("x".into())) })
            .await;
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn retry_then_circuit_breaker_retries_until_success() {
        let engine = ResilienceEngine::new();
        let (source, _token) = cancellation_pair();
        let policy = ResiliencePolicy::named("svc")
            .with(PolicyKind::Retry(RetryConfig {
                max_attempts: 5,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                strategy: RetryStrategy::Fixed,
                use_jitter: false,
                predicate: Arc::new(|_| true),
            }))
            .with(PolicyKind::CircuitBreaker(CircuitBreakerConfig {
                failure_threshold: 10,
                ..CircuitBreakerConfig::default()
            }));

        let attempts = AtomicU32::new(0);
        let result: Result<&str, PreprocessError> = engine
            .execute(&policy, &source, || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(PreprocessError::Network("boom".into()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
