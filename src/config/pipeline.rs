//! Pipeline configuration: the small, flat surface that governs a single
//! Extract→Analyze→Reconstruct→Chunk run. Follows a "collect fields,
//! validate once at build time" shape, without a typestate — every field
//! here has a sensible default, so nothing is mandatory before build.

use std::time::Duration;

use thiserror::Error;

use crate::chunking::ChunkingStrategy;
use crate::model::ReconstructStrategy;
use crate::resilience::{
    BulkheadConfig, CircuitBreakerConfig, PolicyKind, ResiliencePolicy, RetryConfig, TimeoutConfig,
};

/// One primitive in `resilience.execution_order`. Mirrors
/// `resilience::PolicyKind`'s variants without carrying their tuning
/// parameters, which stay at their crate defaults for pipeline use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResilienceStage {
    Retry,
    CircuitBreaker,
    Timeout,
    Bulkhead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingSettings {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    pub overlap: usize,
    pub strategy: ChunkingStrategy,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { max_chunk_size: 1000, min_chunk_size: 100, overlap: 50, strategy: ChunkingStrategy::Auto }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructSettings {
    pub strategy: ReconstructStrategy,
}

impl Default for ReconstructSettings {
    fn default() -> Self {
        Self { strategy: ReconstructStrategy::None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_concurrency: usize,
    pub user_agent: String,
    pub default_timeout: Duration,
    pub respect_robots_txt: bool,
    pub chunking: ChunkingSettings,
    pub reconstruct: ReconstructSettings,
    pub resilience_execution_order: Vec<ResilienceStage>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            user_agent: "webreap/1.0".to_string(),
            default_timeout: Duration::from_secs(30),
            respect_robots_txt: true,
            chunking: ChunkingSettings::default(),
            reconstruct: ReconstructSettings::default(),
            resilience_execution_order: vec![
                ResilienceStage::Retry,
                ResilienceStage::CircuitBreaker,
                ResilienceStage::Timeout,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_concurrency must be greater than zero")]
    MaxConcurrencyZero,
    #[error("user_agent must not be empty")]
    EmptyUserAgent,
    #[error("default_timeout must be greater than zero")]
    ZeroTimeout,
    #[error("chunking.min_chunk_size must be greater than zero")]
    MinChunkSizeZero,
    #[error("chunking.max_chunk_size must be greater than chunking.min_chunk_size")]
    MaxNotGreaterThanMin,
    #[error("chunking.overlap must be less than chunking.max_chunk_size")]
    OverlapTooLarge,
    #[error("resilience.execution_order lists {0:?} more than once")]
    DuplicateResilienceStage(ResilienceStage),
}

impl PipelineConfig {
    /// Validate every field and return every violation found, not just the
    /// first.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.max_concurrency == 0 {
            errors.push(ConfigError::MaxConcurrencyZero);
        }
        if self.user_agent.trim().is_empty() {
            errors.push(ConfigError::EmptyUserAgent);
        }
        if self.default_timeout.is_zero() {
            errors.push(ConfigError::ZeroTimeout);
        }
        if self.chunking.min_chunk_size == 0 {
            errors.push(ConfigError::MinChunkSizeZero);
        }
        if self.chunking.max_chunk_size <= self.chunking.min_chunk_size {
            errors.push(ConfigError::MaxNotGreaterThanMin);
        }
        if self.chunking.overlap >= self.chunking.max_chunk_size {
            errors.push(ConfigError::OverlapTooLarge);
        }
        for (i, stage) in self.resilience_execution_order.iter().enumerate() {
            if self.resilience_execution_order[..i].contains(stage) {
                errors.push(ConfigError::DuplicateResilienceStage(*stage));
            }
        }

        errors
    }

    /// Build a `ResiliencePolicy` from `resilience_execution_order`, each
    /// stage at its crate-default tuning.
    #[must_use]
    pub fn resilience_policy(&self, name: impl Into<String>) -> ResiliencePolicy {
        let mut policy = ResiliencePolicy::named(name);
        for stage in &self.resilience_execution_order {
            let kind = match stage {
                ResilienceStage::Retry => PolicyKind::Retry(RetryConfig::default()),
                ResilienceStage::CircuitBreaker => PolicyKind::CircuitBreaker(CircuitBreakerConfig::default()),
                ResilienceStage::Timeout => PolicyKind::Timeout(TimeoutConfig { timeout: self.default_timeout, ..TimeoutConfig::default() }),
                ResilienceStage::Bulkhead => PolicyKind::Bulkhead(BulkheadConfig::default()),
            };
            policy = policy.with(kind);
        }
        policy
    }
}

/// Fluent builder mirroring `CrawlConfigBuilder`'s method-per-field shape.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    #[must_use]
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.config.max_concurrency = value;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    #[must_use]
    pub fn default_timeout(mut self, value: Duration) -> Self {
        self.config.default_timeout = value;
        self
    }

    #[must_use]
    pub fn respect_robots_txt(mut self, value: bool) -> Self {
        self.config.respect_robots_txt = value;
        self
    }

    #[must_use]
    pub fn chunking(mut self, value: ChunkingSettings) -> Self {
        self.config.chunking = value;
        self
    }

    #[must_use]
    pub fn reconstruct(mut self, value: ReconstructSettings) -> Self {
        self.config.reconstruct = value;
        self
    }

    #[must_use]
    pub fn resilience_execution_order(mut self, order: Vec<ResilienceStage>) -> Self {
        self.config.resilience_execution_order = order;
        self
    }

    /// Validate and build. Returns every violation found rather than the
    /// first, matching `PipelineConfig::validate`.
    pub fn build(self) -> Result<PipelineConfig, Vec<ConfigError>> {
        let errors = self.config.validate();
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(errors)
        }
    }
}
