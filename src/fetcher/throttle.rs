//! Per-host throttle map: `host → {last_request_time, min_interval}`,
//! updated atomically over a lock-free, per-domain `DashMap`. Simplified
//! from a token bucket to a plain "await last_request_time + min_interval"
//! contract.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct HostState {
    last_request: Instant,
    min_interval: Duration,
}

/// Tracks the earliest time each host may next be fetched.
pub struct ThrottleMap {
    hosts: DashMap<String, Arc<Mutex<HostState>>>,
    default_min_interval: Duration,
}

impl ThrottleMap {
    #[must_use]
    pub fn new(default_min_interval: Duration) -> Self {
        Self { hosts: DashMap::new(), default_min_interval }
    }

    /// Wait until `host` is eligible for another request, then reserve the
    /// next slot. `robots_crawl_delay` overrides the configured default for
    /// this host, if present (spec: "robots Crawl-delay, if present,
    /// overrides configured default").
    pub async fn wait_turn(&self, host: &str, robots_crawl_delay: Option<Duration>) {
        let entry = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(HostState {
                    last_request: Instant::now() - self.default_min_interval,
                    min_interval: self.default_min_interval,
                }))
            })
            .clone();

        let mut state = entry.lock().await;
        if let Some(delay) = robots_crawl_delay {
            state.min_interval = delay;
        }
        let ready_at = state.last_request + state.min_interval;
        let now = Instant::now();
        if ready_at > now {
            tokio::time::sleep(ready_at - now).await;
        }
        state.last_request = Instant::now();
    }

    #[must_use]
    pub fn tracked_hosts(&self) -> usize {
        self.hosts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializes_requests_to_the_same_host_by_min_interval() {
        let map = ThrottleMap::new(Duration::from_millis(30));
        let start = std::time::Instant::now();
        map.wait_turn("example.com", None).await;
        map.wait_turn("example.com", None).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn distinct_hosts_do_not_block_each_other() {
        let map = ThrottleMap::new(Duration::from_millis(200));
        map.wait_turn("a.example.com", None).await;
        let start = std::time::Instant::now();
        map.wait_turn("b.example.com", None).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn robots_crawl_delay_overrides_default() {
        let map = ThrottleMap::new(Duration::from_millis(5));
        map.wait_turn("slow.example.com", Some(Duration::from_millis(50))).await;
        let start = std::time::Instant::now();
        map.wait_turn("slow.example.com", Some(Duration::from_millis(50))).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
