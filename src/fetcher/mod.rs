//! Fetcher: Static HTTP GET or delegated Dynamic render, fronted by the
//! Resilience Engine's HTTP policy and gated by a per-host throttle. Built
//! on `reqwest` (rustls-tls), with a `DashMap`-backed per-host rate limiter.

pub mod throttle;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::capabilities::Capabilities;
use crate::error::PreprocessError;
use crate::resilience::{ResilienceEngine, ResiliencePolicy};
use crate::robots::{self, RobotsCache};

pub use throttle::ThrottleMap;

/// Which path a request takes through the Fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Single HTTP GET with redirect following.
    Static,
    /// Delegate to the injected `BrowserRender` capability.
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub redirect_limit: usize,
    pub default_min_interval: Duration,
    /// Content-type prefixes accepted before body download; anything else
    /// yields `PreprocessError::NotSupported`.
    pub allowed_content_types: Vec<String>,
    pub request_timeout: Duration,
    pub respect_robots: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "webreap/0.1".to_string(),
            redirect_limit: 10,
            default_min_interval: Duration::from_millis(500),
            allowed_content_types: vec!["text/html".to_string(), "application/xhtml+xml".to_string()],
            request_timeout: Duration::from_secs(30),
            respect_robots: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub html: String,
    pub mode_used: FetchMode,
}

/// Heuristic threshold: HTML under this size with heavy script density is
/// treated as "SPA-looking" and routed to Dynamic mode.
const SPA_SIZE_THRESHOLD_BYTES: usize = 5_000;
const SPA_SCRIPT_TAG_THRESHOLD: usize = 5;

pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
    throttle: ThrottleMap,
    robots: RobotsCache,
    resilience: Arc<ResilienceEngine>,
    capabilities: Capabilities,
}

impl Fetcher {
    #[must_use]
    pub fn new(config: FetcherConfig, resilience: Arc<ResilienceEngine>, capabilities: Capabilities) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.redirect_limit))
            .timeout(config.request_timeout)
            .build()
            .expect("static TLS/client configuration is always valid");

        Self {
            throttle: ThrottleMap::new(config.default_min_interval),
            robots: RobotsCache::default(),
            client,
            config,
            resilience,
            capabilities,
        }
    }

    /// Fetch `url`, selecting Static/Dynamic per `requested_mode` or the
    /// SPA-looking heuristic when `None`. Always resilience-wrapped and
    /// per-host throttled.
    pub async fn fetch(
        &self,
        url: &str,
        requested_mode: Option<FetchMode>,
        cancel: &crate::cancellation::CancellationSource,
    ) -> Result<FetchedPage, PreprocessError> {
        let parsed = Url::parse(url).map_err(|e| PreprocessError::Validation(format!("invalid URL {url}: {e}")))?;
        let host = parsed.host_str().unwrap_or_default().to_string();

        if self.config.respect_robots {
            self.ensure_robots_cached(&parsed, &host).await;
            if self.robots.allowed(&host, url, &self.config.user_agent) == Some(false) {
                return Err(PreprocessError::RobotsBlocked(url.to_string()));
            }
            let crawl_delay = self.robots.crawl_delay(&host);
            self.throttle.wait_turn(&host, crawl_delay).await;
        } else {
            self.throttle.wait_turn(&host, None).await;
        }

        let policy = ResiliencePolicy::http_default(format!("fetch:{host}"));
        let first_pass = self
            .resilience
            .execute(&policy, cancel, || self.fetch_static(url))
            .await?;

        let mode = requested_mode.unwrap_or_else(|| {
            if looks_like_spa(&first_pass.html) {
                FetchMode::Dynamic
            } else {
                FetchMode::Static
            }
        });

        match mode {
            FetchMode::Static => Ok(first_pass),
            FetchMode::Dynamic => self.fetch_dynamic(url).await,
        }
    }

    /// Fetch and cache `/robots.txt` for `host` if the cache is stale.
    /// Fetch failures are treated as "no restrictions" (a fetch failure
    /// here should not silently block the entire host).
    async fn ensure_robots_cached(&self, base: &Url, host: &str) {
        if self.robots.is_fresh(host) {
            return;
        }
        let Ok(robots_url) = base.join("/robots.txt") else {
            return;
        };
        match self.client.get(robots_url.as_str()).send().await {
            Ok(response) if response.status().is_success() => {
                if let Ok(body) = response.text().await {
                    self.robots.put(host, robots::parse(&body, base.as_str()));
                }
            }
            Ok(_) | Err(_) => {
                // No robots.txt, or unreachable: treat as unrestricted but
                // do not poison the cache with an empty entry so the next
                // request retries the fetch.
            }
        }
    }

    async fn fetch_static(&self, url: &str) -> Result<FetchedPage, PreprocessError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(ct) = &content_type {
            let base = ct.split(';').next().unwrap_or(ct).trim();
            if !self.config.allowed_content_types.iter().any(|allowed| base == allowed) {
                return Err(PreprocessError::NotSupported(format!("unsupported content-type: {base}")));
            }
        }

        classify_status(status)?;

        let html = response.text().await.map_err(|e| classify_reqwest_error(&e))?;

        debug!("fetched {url} -> {status} ({} bytes)", html.len());

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            html,
            mode_used: FetchMode::Static,
        })
    }

    async fn fetch_dynamic(&self, url: &str) -> Result<FetchedPage, PreprocessError> {
        let Some(renderer) = &self.capabilities.browser_render else {
            warn!("dynamic fetch requested for {url} but no BrowserRender capability is configured");
            return Err(PreprocessError::NotSupported(
                "dynamic rendering requested but no BrowserRender capability configured".to_string(),
            ));
        };
        let options = crate::capabilities::RenderOptions::default();
        let rendered = renderer.render(url, &options).await?;
        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url: rendered.final_url,
            status: rendered.status_code,
            content_type: Some("text/html".to_string()),
            html: rendered.html,
            mode_used: FetchMode::Dynamic,
        })
    }
}

fn looks_like_spa(html: &str) -> bool {
    if html.len() >= SPA_SIZE_THRESHOLD_BYTES {
        return false;
    }
    html.matches("<script").count() >= SPA_SCRIPT_TAG_THRESHOLD
}

/// 2xx succeeds; 4xx is non-retryable; 429/5xx is retryable.
/// Redirects are already resolved transparently by the client's redirect
/// policy, so 3xx should not reach here in practice.
fn classify_status(status: StatusCode) -> Result<(), PreprocessError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(PreprocessError::Network(format!("retryable HTTP status {status}")));
    }
    Err(PreprocessError::Validation(format!("non-retryable HTTP status {status}")))
}

fn classify_reqwest_error(err: &reqwest::Error) -> PreprocessError {
    if err.is_timeout() {
        PreprocessError::Timeout(Duration::from_secs(0))
    } else {
        PreprocessError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_script_heavy_html_is_spa_looking() {
        let html = "<html><body>".to_string() + &"<script src=x></script>".repeat(6) + "</body></html>";
        assert!(looks_like_spa(&html));
    }

    #[test]
    fn large_html_is_never_spa_looking_regardless_of_scripts() {
        let mut html = "<script src=x></script>".repeat(10);
        html.push_str(&"a".repeat(SPA_SIZE_THRESHOLD_BYTES));
        assert!(!looks_like_spa(&html));
    }

    #[test]
    fn status_classification_matches_spec_table() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(matches!(classify_status(StatusCode::NOT_FOUND), Err(PreprocessError::Validation(_))));
        assert!(matches!(classify_status(StatusCode::TOO_MANY_REQUESTS), Err(PreprocessError::Network(_))));
        assert!(matches!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), Err(PreprocessError::Network(_))));
    }
}
