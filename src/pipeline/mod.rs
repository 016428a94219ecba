//! Pipeline Orchestrator: owns the frontier, visited set, per-host
//! throttling (delegated to the Fetcher), and an outbound event channel;
//! drives the Extract→Analyze→Reconstruct→Chunk stages in order for every
//! popped URL, "own the queue, drive a per-URL pipeline, emit progress".

pub mod events;
pub mod frontier;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use scraper::{Html, Selector};
use tokio::task::JoinSet;
use url::Url;

use crate::analyzer::{self, AnalyzerConfig};
use crate::cancellation::{CancellationSource, CancellationToken};
use crate::capabilities::Capabilities;
use crate::chunking::{self, ChunkingOptions, ChunkingStrategy};
use crate::error::PreprocessError;
use crate::fetcher::{FetchedPage, Fetcher};
use crate::html_cleaner::{self, CleanedHtml, HtmlCleanerConfig};
use crate::markdown::{self, MarkdownConfig};
use crate::metadata::{self, ExtractedMetadata};
use crate::model::{AnalyzedContent, Chunk, ExtractedContent, QualityInfo, ReconstructStrategy};
use crate::reconstruct::{self, ReconstructOptions};
use crate::url_normalize;

pub use events::{channel, EventReceiver, EventSender, PipelineEvent};
pub use frontier::{Frontier, FrontierEntry, FrontierStrategy};

/// Per-stage on/off switches: each stage may be flagged off via
/// `enabled_stages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledStages {
    pub clean: bool,
    pub convert: bool,
    pub extract_metadata: bool,
    pub analyze: bool,
    pub reconstruct: bool,
    pub chunk: bool,
}

impl Default for EnabledStages {
    fn default() -> Self {
        Self { clean: true, convert: true, extract_metadata: true, analyze: true, reconstruct: true, chunk: true }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub start_urls: Vec<String>,
    pub max_depth: usize,
    pub max_pages: usize,
    /// Upper bound on pages fetched/processed concurrently: worker tasks
    /// are spawned up to this limit, reclaimed as they finish.
    pub max_concurrency: usize,
    pub frontier_strategy: FrontierStrategy,
    pub follow_external_links: bool,
    pub global_timeout: Duration,
    pub enabled_stages: EnabledStages,
    pub chunking_strategy: ChunkingStrategy,
    pub chunking: ChunkingOptions,
    pub reconstruct: ReconstructOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            max_depth: 2,
            max_pages: 100,
            max_concurrency: 10,
            frontier_strategy: FrontierStrategy::Bfs,
            follow_external_links: false,
            global_timeout: Duration::from_secs(300),
            enabled_stages: EnabledStages::default(),
            chunking_strategy: ChunkingStrategy::Auto,
            chunking: ChunkingOptions::default(),
            reconstruct: ReconstructOptions::default(),
        }
    }
}

impl CrawlOptions {
    /// Derive run options from a validated `PipelineConfig` plus the seed
    /// URLs for this run.
    #[must_use]
    pub fn from_pipeline_config(config: &crate::config::PipelineConfig, start_urls: Vec<String>) -> Self {
        Self {
            start_urls,
            max_concurrency: config.max_concurrency,
            global_timeout: config.default_timeout,
            chunking_strategy: config.chunking.strategy,
            chunking: ChunkingOptions {
                max_size: config.chunking.max_chunk_size,
                min_size: config.chunking.min_chunk_size,
                overlap: config.chunking.overlap,
                ..ChunkingOptions::default()
            },
            reconstruct: ReconstructOptions { strategy: config.reconstruct.strategy, ..ReconstructOptions::default() },
            ..Self::default()
        }
    }
}

/// Derive a `FetcherConfig` from a validated `PipelineConfig`.
#[must_use]
pub fn fetcher_config_from_pipeline_config(config: &crate::config::PipelineConfig) -> crate::fetcher::FetcherConfig {
    crate::fetcher::FetcherConfig {
        user_agent: config.user_agent.clone(),
        request_timeout: config.default_timeout,
        respect_robots: config.respect_robots_txt,
        ..crate::fetcher::FetcherConfig::default()
    }
}

#[derive(Debug, Clone)]
pub struct PageResult {
    pub url: String,
    pub depth: usize,
    pub extracted: ExtractedContent,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub pages: Vec<PageResult>,
    pub pages_processed: usize,
    pub errors: Vec<(String, String)>,
    pub cancelled: bool,
}

/// Explicit capability bag: plain constructor arguments rather than a
/// dependency-injection container. Cheaply `Clone`: every field is an
/// `Arc` or a small value type, so a clone can move into each worker task.
#[derive(Clone)]
pub struct Orchestrator {
    fetcher: Arc<Fetcher>,
    capabilities: Capabilities,
    analyzer_config: AnalyzerConfig,
}

impl Orchestrator {
    #[must_use]
    pub fn new(fetcher: Arc<Fetcher>, capabilities: Capabilities) -> Self {
        Self { fetcher, capabilities, analyzer_config: AnalyzerConfig::default() }
    }

    /// Run a crawl to completion. The frontier and visited set stay owned
    /// by this loop; up to `options.max_concurrency` `process_url` calls
    /// run concurrently as worker tasks, each reclaiming its slot as soon
    /// as it completes. Cooperative cancellation: when `cancel` is
    /// observed, the loop stops spawning new work, aborts any in-flight
    /// tasks, and returns a partial `CrawlSummary` with `cancelled: true`
    /// alongside a `Cancelled` event — never an error.
    pub async fn run(
        &self,
        options: &CrawlOptions,
        events: &EventSender,
        cancel_source: &CancellationSource,
        cancel_token: &CancellationToken,
    ) -> CrawlSummary {
        let mut frontier = Frontier::new(options.frontier_strategy);
        let mut visited: HashSet<String> = HashSet::new();
        let mut summary = CrawlSummary::default();
        let max_concurrency = options.max_concurrency.max(1);

        for start in &options.start_urls {
            frontier.push(FrontierEntry { url: start.clone(), depth: 0, priority: 0 });
        }
        tracing::info!(start_urls = ?options.start_urls, "crawl started");
        let _ = events.send(PipelineEvent::Started { start_urls: options.start_urls.clone() });

        let deadline = Instant::now() + options.global_timeout;
        let mut in_flight: JoinSet<(FrontierEntry, Result<(PageResult, Vec<String>), PreprocessError>)> = JoinSet::new();

        loop {
            if cancel_token.is_cancelled() {
                summary.cancelled = true;
                tracing::warn!("crawl cancelled");
                let _ = events.send(PipelineEvent::Cancelled);
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!("crawl hit its global timeout");
                break;
            }

            while in_flight.len() < max_concurrency && summary.pages_processed + in_flight.len() < options.max_pages {
                let Some(entry) = frontier.pop() else { break };
                let normalized = url_normalize::normalize(&entry.url);
                if entry.depth > options.max_depth || visited.contains(&normalized) {
                    continue;
                }
                visited.insert(normalized);

                let orchestrator = self.clone();
                let cancel = cancel_source.clone();
                let spawn_options = options.clone();
                in_flight.spawn(async move {
                    let result = orchestrator.process_url(&entry, &spawn_options, &cancel).await;
                    (entry, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            let Some(joined) = in_flight.join_next().await else { break };
            let (entry, result) = match joined {
                Ok(pair) => pair,
                Err(join_error) => {
                    tracing::warn!(error = %join_error, "worker task panicked");
                    continue;
                }
            };

            match result {
                Ok((result, discovered)) => {
                    summary.pages_processed += 1;
                    tracing::debug!(url = %entry.url, depth = entry.depth, chunks = result.chunks.len(), "page completed");
                    let _ = events.send(PipelineEvent::PageCompleted {
                        url: entry.url.clone(),
                        depth: entry.depth,
                        chunks: result.chunks.len(),
                    });

                    if entry.depth < options.max_depth {
                        for link in discovered {
                            if !options.follow_external_links && !same_registrable_domain(&entry.url, &link) {
                                continue;
                            }
                            let link_normalized = url_normalize::normalize(&link);
                            if !visited.contains(&link_normalized) {
                                let depth = entry.depth + 1;
                                frontier.push(FrontierEntry {
                                    url: link,
                                    depth,
                                    priority: priority_for(options.frontier_strategy, depth),
                                });
                            }
                        }
                    }
                    summary.pages.push(result);
                }
                Err(PreprocessError::RobotsBlocked(url)) => {
                    tracing::debug!(%url, "robots disallowed");
                    let _ = events.send(PipelineEvent::RobotsBlocked { url });
                }
                Err(err) => {
                    tracing::warn!(url = %entry.url, error = %err, "stage failed");
                    summary.errors.push((entry.url.clone(), err.to_string()));
                    let _ = events.send(PipelineEvent::StageFailed {
                        url: entry.url.clone(),
                        stage: "fetch",
                        error: err.to_string(),
                    });
                }
            }
        }

        in_flight.shutdown().await;
        tracing::info!(pages_processed = summary.pages_processed, "crawl completed");
        let _ = events.send(PipelineEvent::Completed { pages_processed: summary.pages_processed });
        summary
    }

    async fn process_url(
        &self,
        entry: &FrontierEntry,
        options: &CrawlOptions,
        cancel: &CancellationSource,
    ) -> Result<(PageResult, Vec<String>), PreprocessError> {
        let fetched = self.fetcher.fetch(&entry.url, None, cancel).await?;
        let page_url = Url::parse(&fetched.final_url).map_err(|e| PreprocessError::Validation(e.to_string()))?;

        let discovered_links = discover_links(&fetched.html, &page_url);
        let extracted = self.extract(&fetched, &page_url, options).await?;

        let chunks = if options.enabled_stages.chunk {
            self.analyze_reconstruct_and_chunk(extracted.clone(), options).await
        } else {
            Vec::new()
        };

        Ok((PageResult { url: entry.url.clone(), depth: entry.depth, extracted, chunks }, discovered_links))
    }

    /// Stages E (clean), F (convert), G (metadata).
    async fn extract(&self, fetched: &FetchedPage, page_url: &Url, options: &CrawlOptions) -> Result<ExtractedContent, PreprocessError> {
        let cleaned = if options.enabled_stages.clean {
            html_cleaner::clean(&fetched.html, page_url, &HtmlCleanerConfig::default())?
        } else {
            CleanedHtml { html: fetched.html.clone(), matched_selector: None }
        };

        let main_content = if options.enabled_stages.convert {
            markdown::convert(&cleaned.html, &MarkdownConfig { base_url: Some(page_url.clone()) })?
        } else {
            cleaned.html.clone()
        };

        let metadata = if options.enabled_stages.extract_metadata {
            metadata::extract(&fetched.html)
        } else {
            ExtractedMetadata::default()
        };

        let word_count = main_content.split_whitespace().count();
        Ok(ExtractedContent {
            url: fetched.requested_url.clone(),
            title: metadata.basic.title.clone().unwrap_or_default(),
            main_content: main_content.clone(),
            raw_markdown: main_content.clone(),
            fit_markdown: main_content,
            word_count,
            language: metadata.basic.language.clone(),
            image_urls: extract_attrs(&cleaned.html, "img", "src", page_url),
            link_urls: discover_links(&cleaned.html, page_url),
            metadata,
            quality_info: QualityInfo::default(),
        })
    }

    /// Analyze, reconstruct, then chunk. Reconstructed text feeds chunking
    /// directly: the Reconstructor's output becomes the Markdown chunking
    /// operates on.
    async fn analyze_reconstruct_and_chunk(&self, extracted: ExtractedContent, options: &CrawlOptions) -> Vec<Chunk> {
        let analyzed = if options.enabled_stages.analyze {
            analyzer::analyze(extracted, &self.analyzer_config)
        } else {
            passthrough_analysis(extracted)
        };

        let reconstruct_options =
            if options.enabled_stages.reconstruct { options.reconstruct.clone() } else { ReconstructOptions { strategy: ReconstructStrategy::None, ..options.reconstruct.clone() } };
        let reconstructed = reconstruct::reconstruct(analyzed, &reconstruct_options, self.capabilities.llm.as_deref()).await;

        let mut chunk_source = reconstructed.analyzed;
        chunk_source.extracted.fit_markdown = reconstructed.reconstructed_text;

        chunking::chunk(
            &chunk_source,
            options.chunking_strategy,
            &options.chunking,
            self.capabilities.embedding.as_deref(),
            self.capabilities.llm.as_deref(),
        )
        .await
    }
}

fn passthrough_analysis(extracted: ExtractedContent) -> AnalyzedContent {
    AnalyzedContent { extracted, sections: Vec::new(), content_type: crate::model::ContentType::Article, content_quality_score: 0.0 }
}

/// Priority heuristic for `Intelligent`/`Priority` frontier strategies
/// absent an LLM scorer: shallower pages rank higher.
fn priority_for(strategy: FrontierStrategy, depth: usize) -> i64 {
    match strategy {
        FrontierStrategy::Priority | FrontierStrategy::Intelligent => -(depth as i64),
        _ => 0,
    }
}

fn same_registrable_domain(a: &str, b: &str) -> bool {
    let host = |u: &str| Url::parse(u).ok().and_then(|p| p.host_str().map(str::to_string));
    match (host(a), host(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn discover_links(html: &str, base: &Url) -> Vec<String> {
    extract_attrs(html, "a", "href", base)
}

fn extract_attrs(html: &str, tag: &str, attr: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse(&format!("{tag}[{attr}]")) else { return Vec::new() };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .filter_map(|value| base.join(value).ok())
        .map(|url| url.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::ResilienceEngine;
    use crate::fetcher::FetcherConfig;

    fn orchestrator() -> Orchestrator {
        let fetcher = Arc::new(Fetcher::new(FetcherConfig::default(), Arc::new(ResilienceEngine::new()), Capabilities::none()));
        Orchestrator::new(fetcher, Capabilities::none())
    }

    #[test]
    fn same_registrable_domain_matches_host_only() {
        assert!(same_registrable_domain("https://example.com/a", "https://example.com/b"));
        assert!(!same_registrable_domain("https://example.com/a", "https://other.com/b"));
    }

    #[test]
    fn crawl_options_inherit_chunking_settings_from_pipeline_config() {
        use crate::config::{ChunkingSettings, PipelineConfig};

        let config = PipelineConfig {
            chunking: ChunkingSettings { max_chunk_size: 500, min_chunk_size: 50, overlap: 20, strategy: ChunkingStrategy::Paragraph },
            ..PipelineConfig::default()
        };
        let options = CrawlOptions::from_pipeline_config(&config, vec!["https://example.com".to_string()]);
        assert_eq!(options.chunking.max_size, 500);
        assert_eq!(options.chunking.min_size, 50);
        assert_eq!(options.chunking_strategy, ChunkingStrategy::Paragraph);
    }

    #[test]
    fn discover_links_resolves_relative_hrefs() {
        let base = Url::parse("https://example.com/dir/page.html").unwrap();
        let html = r#"<a href="/abs">A</a><a href="rel.html">B</a><a href="https://elsewhere.com/x">C</a>"#;
        let links = discover_links(html, &base);
        assert!(links.contains(&"https://example.com/abs".to_string()));
        assert!(links.contains(&"https://example.com/dir/rel.html".to_string()));
        assert!(links.contains(&"https://elsewhere.com/x".to_string()));
    }

    #[tokio::test]
    async fn run_with_no_start_urls_completes_immediately() {
        let orch = orchestrator();
        let (tx, mut rx) = channel();
        let (source, token) = crate::cancellation::cancellation_pair();
        let options = CrawlOptions::default();
        let summary = orch.run(&options, &tx, &source, &token).await;
        assert_eq!(summary.pages_processed, 0);
        assert!(!summary.cancelled);
        drop(tx);
        let mut saw_started = false;
        let mut saw_completed = false;
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Started { .. } => saw_started = true,
                PipelineEvent::Completed { .. } => saw_completed = true,
                _ => {}
            }
        }
        assert!(saw_started && saw_completed);
    }

    #[tokio::test]
    async fn run_stops_immediately_when_already_cancelled() {
        let orch = orchestrator();
        let (tx, _rx) = channel();
        let (source, token) = crate::cancellation::cancellation_pair();
        source.cancel();
        let options = CrawlOptions { start_urls: vec!["https://example.com".to_string()], ..CrawlOptions::default() };
        let summary = orch.run(&options, &tx, &source, &token).await;
        assert!(summary.cancelled);
        assert_eq!(summary.pages_processed, 0);
    }
}
