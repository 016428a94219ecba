//! A tiny cooperative cancellation signal.
//!
//! Every stage observes this at its await points; in-flight LLM calls pass
//! it straight through. Deliberately minimal — a `watch` channel carrying a
//! single boolean — rather than pulling in `tokio-util`'s `CancellationToken`
//! for a narrow need.

use tokio::sync::watch;

/// Observer half, cheaply cloneable, handed to every pipeline stage.
#[derive(Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

/// Owner half; calling `cancel()` is idempotent and visible to every clone
/// of the paired `CancellationToken`.
#[derive(Clone)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

#[must_use]
pub fn cancellation_pair() -> (CancellationSource, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancellationSource { tx }, CancellationToken { rx })
}

impl CancellationSource {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CancellationToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel()` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellation_is_observed_by_clones() {
        let (source, token) = cancellation_pair();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        source.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
        clone.cancelled().await; // resolves immediately, already cancelled
    }
}
