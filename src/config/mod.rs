//! Pipeline configuration: validated settings for a crawl run, built with a
//! plain fluent builder rather than the typestate pattern a mandatory-field
//! config would need.

pub mod pipeline;

pub use pipeline::{
    ChunkingSettings, ConfigError, PipelineConfig, PipelineConfigBuilder, ReconstructSettings, ResilienceStage,
};
