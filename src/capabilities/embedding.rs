//! Embedding capability contract. Not used to build or query a vector
//! index in this crate — exposed only so the Reconstructor and quality
//! harness can request a vector for similarity scoring.

use async_trait::async_trait;

use crate::error::PreprocessError;

/// Embedding capability.
#[async_trait]
pub trait Embedding: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PreprocessError>;
}
