//! Timeout primitive.

use std::time::Duration;

use crate::cancellation::CancellationSource;
use crate::error::PreprocessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStrategy {
    /// Signal the ambient cancellation token and keep awaiting completion.
    Cooperative,
    /// Abandon the wait immediately; late completions are not awaited.
    Pessimistic,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    pub timeout: Duration,
    pub strategy: TimeoutStrategy,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            strategy: TimeoutStrategy::Pessimistic,
        }
    }
}

/// Run `fut` under the timeout policy. `cancel_source` is only used (fired)
/// for the `Cooperative` strategy.
pub async fn run_timeout<T, Fut>(
    cfg: &TimeoutConfig,
    cancel_source: &CancellationSource,
    fut: Fut,
) -> Result<T, PreprocessError>
where
    Fut: std::future::Future<Output = Result<T, PreprocessError>>,
{
    tokio::pin!(fut);
    match cfg.strategy {
        TimeoutStrategy::Pessimistic => tokio::select! {
            r = &mut fut => r,
            () = tokio::time::sleep(cfg.timeout) => Err(PreprocessError::Timeout(cfg.timeout)),
        },
        TimeoutStrategy::Cooperative => {
            tokio::select! {
                r = &mut fut => r,
                () = tokio::time::sleep(cfg.timeout) => {
                    cancel_source.cancel();
                    fut.await
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::cancellation_pair;

    #[tokio::test]
    async fn pessimistic_abandons_late_completion() {
        let (source, _token) = cancellation_pair();
        let cfg = TimeoutConfig {
            timeout: Duration::from_millis(10),
            strategy: TimeoutStrategy::Pessimistic,
        };
        let result: Result<(), PreprocessError> = run_timeout(&cfg, &source, async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(PreprocessError::Timeout(_))));
    }

    #[tokio::test]
    async fn cooperative_signals_and_awaits_completion() {
        let (source, token) = cancellation_pair();
        let cfg = TimeoutConfig {
            timeout: Duration::from_millis(10),
            strategy: TimeoutStrategy::Cooperative,
        };
        let token_clone = token.clone();
        let result: Result<&str, PreprocessError> = run_timeout(&cfg, &source, async move {
            token_clone.cancelled().await;
            Ok("observed cancellation")
        })
        .await;
        assert_eq!(result.unwrap(), "observed cancellation");
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn fast_operation_completes_before_timeout() {
        let (source, _token) = cancellation_pair();
        let cfg = TimeoutConfig {
            timeout: Duration::from_secs(1),
            strategy: TimeoutStrategy::Pessimistic,
        };
        let result: Result<&str, PreprocessError> =
            run_timeout(&cfg, &source, async { Ok("fast") }).await;
        assert_eq!(result.unwrap(), "fast");
    }
}
