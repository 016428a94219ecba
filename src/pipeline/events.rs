//! Pipeline progress events: an enum-of-occurrences delivered over a plain
//! `tokio::mpsc` rather than a broadcast channel, since a pipeline run has
//! exactly one natural consumer — the caller driving the run — not a
//! fan-out-to-many subscriber set.

use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started { start_urls: Vec<String> },
    PageFetched { url: String, depth: usize },
    RobotsBlocked { url: String },
    StageFailed { url: String, stage: &'static str, error: String },
    PageCompleted { url: String, depth: usize, chunks: usize },
    Cancelled,
    Completed { pages_processed: usize },
}

pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PipelineEvent>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
