//! Named circuit breaker, keyed per-policy-name rather than per-domain, and
//! extended with a sliding-window failure-ratio path alongside the plain
//! consecutive-failure count.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::{debug, info, warn};

use crate::error::PreprocessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub duration_of_break: Duration,
    pub sampling_duration: Duration,
    pub minimum_throughput: u32,
    pub failure_ratio: f64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            duration_of_break: Duration::from_secs(30),
            sampling_duration: Duration::from_secs(60),
            minimum_throughput: 10,
            failure_ratio: 0.5,
        }
    }
}

struct Window {
    events: VecDeque<(Instant, bool)>, // (timestamp, was_success)
}

struct NamedState {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes_in_half_open: u32,
    opened_at: Option<Instant>,
    window: Window,
}

impl NamedState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes_in_half_open: 0,
            opened_at: None,
            window: Window { events: VecDeque::new() },
        }
    }
}

/// Per-name circuit breaker state held in a concurrent map.
pub struct CircuitBreakerRegistry {
    names: DashMap<String, NamedState>,
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self { names: DashMap::new() }
    }
}

impl CircuitBreakerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a call to `name` should proceed right now; also performs the
    /// Open→HalfOpen transition if the break duration has elapsed.
    pub fn should_attempt(&self, name: &str, cfg: &CircuitBreakerConfig) -> bool {
        let mut entry = self.names.entry(name.to_string()).or_insert_with(NamedState::new);
        match entry.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                if entry.opened_at.is_some_and(|at| at.elapsed() >= cfg.duration_of_break) {
                    entry.state = CircuitState::HalfOpen;
                    entry.consecutive_successes_in_half_open = 0;
                    info!("circuit '{name}' transitioning to half-open");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self, name: &str, cfg: &CircuitBreakerConfig) {
        let mut entry = self.names.entry(name.to_string()).or_insert_with(NamedState::new);
        entry.consecutive_failures = 0;
        push_event(&mut entry.window, cfg.sampling_duration, true);

        if entry.state == CircuitState::HalfOpen {
            entry.consecutive_successes_in_half_open += 1;
            entry.state = CircuitState::Closed;
            debug!("circuit '{name}' closed after half-open success");
        }
    }

    pub fn record_failure(&self, name: &str, cfg: &CircuitBreakerConfig) {
        let mut entry = self.names.entry(name.to_string()).or_insert_with(NamedState::new);
        entry.consecutive_failures += 1;
        push_event(&mut entry.window, cfg.sampling_duration, false);

        if entry.state == CircuitState::HalfOpen {
            open_circuit(&mut entry, name);
            return;
        }

        if entry.consecutive_failures >= cfg.failure_threshold {
            open_circuit(&mut entry, name);
            return;
        }

        let (total, failures) = window_counts(&entry.window);
        if total >= cfg.minimum_throughput {
            let ratio = failures as f64 / total as f64;
            if ratio >= cfg.failure_ratio {
                open_circuit(&mut entry, name);
            }
        }
    }

    #[must_use]
    pub fn state(&self, name: &str) -> CircuitState {
        self.names
            .get(name)
            .map(|e| e.state)
            .unwrap_or(CircuitState::Closed)
    }
}

fn open_circuit(entry: &mut NamedState, name: &str) {
    entry.state = CircuitState::Open;
    entry.opened_at = Some(Instant::now());
    entry.consecutive_successes_in_half_open = 0;
    warn!("circuit '{name}' opened");
}

fn push_event(window: &mut Window, sampling_duration: Duration, success: bool) {
    let now = Instant::now();
    window.events.push_back((now, success));
    while let Some((ts, _)) = window.events.front() {
        if now.duration_since(*ts) > sampling_duration {
            window.events.pop_front();
        } else {
            break;
        }
    }
}

fn window_counts(window: &Window) -> (usize, usize) {
    let total = window.events.len();
    let failures = window.events.iter().filter(|(_, success)| !success).count();
    (total, failures)
}

/// Execute `op` under a named circuit breaker. Fails fast with
/// `CircuitOpen` when the circuit is open, without invoking `op`.
pub async fn run_circuit_breaker<T, F, Fut>(
    registry: &CircuitBreakerRegistry,
    name: &str,
    cfg: &CircuitBreakerConfig,
    op: F,
) -> Result<T, PreprocessError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PreprocessError>>,
{
    if !registry.should_attempt(name, cfg) {
        return Err(PreprocessError::CircuitOpen { policy_name: name.to_string() });
    }

    match op().await {
        Ok(value) => {
            registry.record_success(name, cfg);
            Ok(value)
        }
        Err(err) => {
            registry.record_failure(name, cfg);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn s5_circuit_breaker_open_scenario() {
        let registry = CircuitBreakerRegistry::new();
        let cfg = CircuitBreakerConfig {
            failure_threshold: 3,
            duration_of_break: Duration::from_millis(100),
            ..CircuitBreakerConfig::default()
        };

        for _ in 0..3 {
            let res: Result<(), PreprocessError> =
                run_circuit_breaker(&registry, "svc", &cfg, || async {
                    Err(PreprocessError::Network("boom".into()))
                })
                .await;
            assert!(res.is_err());
        }

        assert_eq!(registry.state("svc"), CircuitState::Open);

        let mut invoked = false;
        let res: Result<(), PreprocessError> = run_circuit_breaker(&registry, "svc", &cfg, || {
            invoked = true;
            async { Ok(()) }
        })
        .await;
        assert!(!invoked, "operation must not run while circuit is open");
        assert!(matches!(res, Err(PreprocessError::CircuitOpen { .. })));
    }

    #[tokio::test]
    async fn half_open_recovers_to_closed() {
        let registry = CircuitBreakerRegistry::new();
        let cfg = CircuitBreakerConfig {
            failure_threshold: 1,
            duration_of_break: Duration::from_millis(20),
            ..CircuitBreakerConfig::default()
        };
        let _: Result<(), _> = run_circuit_breaker(&registry, "svc", &cfg, || async {
            Err(PreprocessError::Network("x".into()))
        })
        .await;
        assert_eq!(registry.state("svc"), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(30)).await;

        let res: Result<(), PreprocessError> =
            run_circuit_breaker(&registry, "svc", &cfg, || async { Ok(()) }).await;
        assert!(res.is_ok());
        assert_eq!(registry.state("svc"), CircuitState::Closed);
    }

    #[tokio::test]
    async fn failure_ratio_path_opens_without_threshold_consecutive() {
        let registry = CircuitBreakerRegistry::new();
        let cfg = CircuitBreakerConfig {
            failure_threshold: 1000, // never hit via consecutive path
            minimum_throughput: 4,
            failure_ratio: 0.5,
            sampling_duration: Duration::from_secs(60),
            duration_of_break: Duration::from_secs(30),
        };
        // 1 success, then 3 failures => ratio 3/4 = 0.75 >= 0.5, throughput 4 >= 4
        let _: Result<(), _> = run_circuit_breaker(&registry, "svc", &cfg, || async { Ok(()) }).await;
        for _ in 0..3 {
            let _: Result<(), _> =
                run_circuit_breaker(&registry, "svc", &cfg, || async {
                    Err(PreprocessError::Network("x".into()))
                })
                .await;
        }
        assert_eq!(registry.state("svc"), CircuitState::Open);
    }
}
