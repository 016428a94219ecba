//! Append-only, bounded statistics ring buffer.
//!
//! A single `parking_lot::Mutex<VecDeque<_>>` guards the buffer, compacted
//! rather than locked on every read — aggregations are computed on demand
//! by the caller.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const MAX_EVENTS: usize = 10_000;
const COMPACT_TO: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Success,
    Failure,
    Retry,
    CircuitOpened,
    Timeout,
    BulkheadRejected,
}

#[derive(Debug, Clone)]
pub struct StatEvent {
    pub event_type: EventType,
    pub policy_name: String,
    pub elapsed: Duration,
    pub timestamp: Instant,
}

/// Bounded, lock-free-on-the-fast-path append buffer.
pub struct StatsBuffer {
    events: Mutex<VecDeque<StatEvent>>,
}

impl Default for StatsBuffer {
    fn default() -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(MAX_EVENTS)),
        }
    }
}

impl StatsBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event_type: EventType, policy_name: impl Into<String>, elapsed: Duration) {
        let mut events = self.events.lock();
        events.push_back(StatEvent {
            event_type,
            policy_name: policy_name.into(),
            elapsed,
            timestamp: Instant::now(),
        });
        if events.len() > MAX_EVENTS {
            let excess = events.len() - COMPACT_TO;
            events.drain(0..excess);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Count of events matching `event_type` for `policy_name`.
    #[must_use]
    pub fn count(&self, policy_name: &str, event_type: EventType) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.policy_name == policy_name && e.event_type == event_type)
            .count()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<StatEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compacts_when_over_capacity() {
        let buf = StatsBuffer::new();
        for _ in 0..(MAX_EVENTS + 100) {
            buf.record(EventType::Success, "p", Duration::from_millis(1));
        }
        assert!(buf.len() <= MAX_EVENTS);
        assert!(buf.len() >= COMPACT_TO);
    }

    #[test]
    fn counts_by_policy_and_type() {
        let buf = StatsBuffer::new();
        buf.record(EventType::Success, "a", Duration::ZERO);
        buf.record(EventType::Failure, "a", Duration::ZERO);
        buf.record(EventType::Success, "b", Duration::ZERO);
        assert_eq!(buf.count("a", EventType::Success), 1);
        assert_eq!(buf.count("a", EventType::Failure), 1);
        assert_eq!(buf.count("b", EventType::Success), 1);
    }
}
