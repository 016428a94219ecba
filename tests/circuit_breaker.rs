//! After `failure_threshold` consecutive failures, the next call within
//! `duration_of_break` fails with `CircuitOpen` without invoking the inner
//! operation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use webreap::cancellation::cancellation_pair;
use webreap::error::PreprocessError;
use webreap::resilience::{CircuitBreakerConfig, PolicyKind, ResiliencePolicy, ResilienceEngine};

#[tokio::test]
async fn circuit_opens_after_consecutive_failures() {
    let engine = ResilienceEngine::new();
    let (source, _token) = cancellation_pair();
    let cfg = CircuitBreakerConfig {
        failure_threshold: 3,
        duration_of_break: Duration::from_millis(100),
        ..CircuitBreakerConfig::default()
    };
    let policy = ResiliencePolicy::named("svc").with(PolicyKind::CircuitBreaker(cfg));

    let invocations = AtomicU32::new(0);
    for _ in 0..3 {
        let result: Result<(), PreprocessError> = engine
            .execute(&policy, &source, || {
                invocations.fetch_add(1, Ordering::SeqCst);
                async { Err(PreprocessError::Network("boom".into())) }
            })
            .await;
        assert!(result.is_err());
    }

    let before = invocations.load(Ordering::SeqCst);
    let result: Result<(), PreprocessError> = engine
        .execute(&policy, &source, || {
            invocations.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

    assert!(matches!(result, Err(PreprocessError::CircuitOpen { .. })));
    assert_eq!(invocations.load(Ordering::SeqCst), before, "the 4th call must not invoke the operation");
}
