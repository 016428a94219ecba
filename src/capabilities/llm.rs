//! Text-completion capability contract, consumed by the Reconstructor and
//! the metadata AI extractor. No concrete provider ships in this crate —
//! callers inject an implementation (OpenAI/Anthropic/local model/whatever),
//! separating the trait boundary from any actual HTTP client.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::PreprocessError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    /// 0.0 ..= 2.0
    pub temperature: f32,
    /// 0.0 ..= 1.0
    pub top_p: f32,
    /// -2.0 ..= 2.0
    pub frequency_penalty: f32,
    /// -2.0 ..= 2.0
    pub presence_penalty: f32,
    pub system_prompt: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model: String,
    pub response_time_ms: u64,
    pub available_models: Vec<String>,
}

/// Text-completion capability.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, PreprocessError>;

    /// Finite, in-order stream of text fragments.
    async fn complete_stream(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<BoxStream<'static, Result<String, PreprocessError>>, PreprocessError>;

    /// Same order as `prompts`.
    async fn complete_batch(
        &self,
        prompts: &[String],
        options: &CompletionOptions,
    ) -> Result<Vec<String>, PreprocessError>;

    async fn is_available(&self) -> bool;

    async fn health(&self) -> Result<HealthStatus, PreprocessError>;
}
