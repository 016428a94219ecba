//! Image-to-text capability contract, consumed by the metadata extractor's
//! optional AI-augmented pass to describe images lacking usable alt text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PreprocessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    Brief,
    Standard,
    Detailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeOptions {
    pub detail_level: DetailLevel,
    pub max_length: usize,
    /// Free-form hint, e.g. "alt text for a blog post".
    pub perspective: Option<String>,
    pub language: Option<String>,
    /// Surrounding page text, to help disambiguate the image's subject.
    pub context: Option<String>,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Standard,
            max_length: 200,
            perspective: None,
            language: None,
            context: None,
        }
    }
}

/// Image-to-text capability. `image_url` is an absolute URL; this crate
/// never fetches or decodes image bytes itself.
#[async_trait]
pub trait ImageToText: Send + Sync {
    async fn describe(&self, image_url: &str, options: &DescribeOptions) -> Result<String, PreprocessError>;
}
