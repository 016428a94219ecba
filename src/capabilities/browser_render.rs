//! Browser-render capability contract. No browser automation ships in this
//! crate — the Fetcher's Dynamic mode delegates to whatever implementation
//! the caller injects.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::PreprocessError;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub wait_for_selector: Option<String>,
    pub timeout: Duration,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wait_for_selector: None,
            timeout: Duration::from_secs(30),
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: String,
    pub status_code: u16,
}

/// Headless-render capability: render a URL to HTML.
#[async_trait]
pub trait BrowserRender: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, PreprocessError>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    pub struct StaticHtmlRenderer {
        pub html: String,
    }

    #[async_trait]
    impl BrowserRender for StaticHtmlRenderer {
        async fn render(&self, url: &str, _options: &RenderOptions) -> Result<RenderedPage, PreprocessError> {
            Ok(RenderedPage {
                html: self.html.clone(),
                final_url: url.to_string(),
                status_code: 200,
            })
        }
    }
}
