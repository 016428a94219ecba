//! Web-content preprocessor for RAG pipelines: fetch, clean, analyze,
//! reconstruct, and chunk pages (see `pipeline` for the orchestrator tying
//! every stage together).

pub mod analyzer;
pub mod cancellation;
pub mod capabilities;
pub mod chunking;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod html_cleaner;
pub mod markdown;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod quality_measurer;
pub mod reconstruct;
pub mod resilience;
pub mod robots;
pub mod url_normalize;

pub use cancellation::{cancellation_pair, CancellationSource, CancellationToken};
pub use capabilities::Capabilities;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::PreprocessError;
pub use fetcher::{FetchMode, Fetcher, FetcherConfig, FetchedPage};
pub use model::{AnalyzedContent, Chunk, ExtractedContent, ReconstructedContent};
pub use pipeline::{CrawlOptions, CrawlSummary, Orchestrator, PipelineEvent};
pub use quality_measurer::QualityReport;
