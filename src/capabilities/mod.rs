//! External interface capabilities: narrow, provider-agnostic contracts the
//! pipeline consumes but never implements. This crate carries no concrete
//! provider at all, only the trait boundary.

pub mod browser_render;
pub mod embedding;
pub mod image_to_text;
pub mod llm;

pub use browser_render::{BrowserRender, RenderOptions, RenderedPage};
pub use embedding::Embedding;
pub use image_to_text::{DescribeOptions, DetailLevel, ImageToText};
pub use llm::{CompletionOptions, HealthStatus, TextCompletion};

use std::sync::Arc;

/// Optional bundle of capabilities a pipeline run may be configured with.
/// Every field is `None` by default (spec: "consumed only via narrow
/// capability-contract traits... no concrete provider ships").
#[derive(Clone, Default)]
pub struct Capabilities {
    pub llm: Option<Arc<dyn TextCompletion>>,
    pub embedding: Option<Arc<dyn Embedding>>,
    pub image_to_text: Option<Arc<dyn ImageToText>>,
    pub browser_render: Option<Arc<dyn BrowserRender>>,
}

impl Capabilities {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn TextCompletion>) -> Self {
        self.llm = Some(llm);
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Arc<dyn Embedding>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[must_use]
    pub fn with_image_to_text(mut self, image_to_text: Arc<dyn ImageToText>) -> Self {
        self.image_to_text = Some(image_to_text);
        self
    }

    #[must_use]
    pub fn with_browser_render(mut self, browser_render: Arc<dyn BrowserRender>) -> Self {
        self.browser_render = Some(browser_render);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundle_has_no_capabilities() {
        let caps = Capabilities::none();
        assert!(caps.llm.is_none());
        assert!(caps.embedding.is_none());
        assert!(caps.image_to_text.is_none());
        assert!(caps.browser_render.is_none());
    }
}
