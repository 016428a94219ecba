//! Minimal demo driver: crawl one or more URLs and print the chunks
//! produced. Not part of the public API; exists to exercise the pipeline
//! end-to-end from the command line.

use std::sync::Arc;

use webreap::config::PipelineConfig;
use webreap::fetcher::Fetcher;
use webreap::pipeline::{channel, fetcher_config_from_pipeline_config, CrawlOptions, Orchestrator, PipelineEvent};
use webreap::resilience::ResilienceEngine;
use webreap::{cancellation_pair, Capabilities};

#[tokio::main]
async fn main() {
    // `log` macros (used by the lower-level resilience primitives) go
    // through env_logger; `tracing` macros (used by the orchestrator) go
    // through tracing-subscriber. Both read `RUST_LOG`.
    env_logger::init();
    tracing_subscriber::fmt::init();

    let start_urls: Vec<String> = std::env::args().skip(1).collect();
    if start_urls.is_empty() {
        eprintln!("usage: webreap-demo <url> [url...]");
        std::process::exit(1);
    }

    let config = PipelineConfig::default();
    let violations = config.validate();
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("invalid pipeline configuration: {violation}");
        }
        std::process::exit(1);
    }

    let resilience = Arc::new(ResilienceEngine::new());
    let fetcher = Arc::new(Fetcher::new(fetcher_config_from_pipeline_config(&config), resilience, Capabilities::none()));
    let orchestrator = Orchestrator::new(fetcher, Capabilities::none());

    let options = CrawlOptions::from_pipeline_config(&config, start_urls);
    let (sender, mut receiver) = channel();
    let (cancel_source, cancel_token) = cancellation_pair();

    let events = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                PipelineEvent::Started { start_urls } => log::info!("started: {start_urls:?}"),
                PipelineEvent::PageFetched { url, depth } => log::info!("fetched {url} (depth {depth})"),
                PipelineEvent::RobotsBlocked { url } => log::warn!("robots-blocked: {url}"),
                PipelineEvent::StageFailed { url, stage, error } => log::warn!("{stage} failed for {url}: {error}"),
                PipelineEvent::PageCompleted { url, depth, chunks } => {
                    println!("{url} (depth {depth}): {chunks} chunks");
                }
                PipelineEvent::Cancelled => log::warn!("crawl cancelled"),
                PipelineEvent::Completed { pages_processed } => log::info!("completed: {pages_processed} pages"),
            }
        }
    });

    let summary = orchestrator.run(&options, &sender, &cancel_source, &cancel_token).await;
    drop(sender);
    let _ = events.await;

    println!("processed {} pages, {} errors", summary.pages_processed, summary.errors.len());
    for (url, error) in &summary.errors {
        eprintln!("  {url}: {error}");
    }
}
