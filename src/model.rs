//! Shared data model: the value types threaded between pipeline stages.
//! A blanket `#[derive(Serialize, Deserialize, Debug, Clone)]` convention
//! applies across the whole module for consistency.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::metadata::ExtractedMetadata;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchResult {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub html_bytes: usize,
    pub content_type: Option<String>,
    #[serde(with = "duration_millis")]
    pub response_time: Duration,
    pub discovered_links: Vec<String>,
    pub error: Option<String>,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        (value.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QualityInfo {
    pub overall_score: f64,
    pub structure_score: f64,
    pub content_score: f64,
    pub noise_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedContent {
    pub url: String,
    pub title: String,
    /// Cleaned Markdown representation (post §4.E/§4.F).
    pub main_content: String,
    /// Markdown before any de-noising by the Analyzer.
    pub raw_markdown: String,
    /// De-noised Markdown, populated once the Analyzer has run.
    pub fit_markdown: String,
    pub word_count: usize,
    pub language: Option<String>,
    pub image_urls: Vec<String>,
    pub link_urls: Vec<String>,
    pub metadata: ExtractedMetadata,
    pub quality_info: QualityInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub heading_level: u8,
    pub text: String,
    pub children: Vec<Section>,
    /// 0 (clean) .. 1 (noise); populated by the Analyzer's density pass.
    pub noise_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ContentType {
    Article,
    Documentation,
    Product,
    Tutorial,
    Blog,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedContent {
    pub extracted: ExtractedContent,
    pub sections: Vec<Section>,
    pub content_type: ContentType,
    pub content_quality_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconstructStrategy {
    None,
    Summarize,
    Expand,
    Rewrite,
    Enrich,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconstructMetrics {
    pub quality: f64,
    pub compression_ratio: f64,
    pub tokens_used: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconstructedContent {
    pub analyzed: AnalyzedContent,
    pub reconstructed_text: String,
    pub strategy_used: ReconstructStrategy,
    pub used_llm: bool,
    pub enhancements: Vec<String>,
    pub metrics: ReconstructMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub heading_path: Vec<String>,
    pub has_code: bool,
    pub has_table: bool,
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub sequence: usize,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// 0-100.
    pub quality_score: f64,
}
