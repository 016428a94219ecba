//! Analyzer: noise removal, section-tree construction, content-quality
//! scoring, and content-type classification.

mod classify;
mod noise;
mod sections;

pub use noise::NoiseConfig;

use crate::model::{AnalyzedContent, ExtractedContent};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub noise: NoiseConfig,
    pub min_section_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { noise: NoiseConfig::default(), min_section_length: 40 }
    }
}

pub fn analyze(mut extracted: ExtractedContent, config: &AnalyzerConfig) -> AnalyzedContent {
    let fit_markdown = noise::strip(&extracted.main_content, &config.noise);
    extracted.fit_markdown = fit_markdown.clone();

    let sections = sections::build(&fit_markdown, config.min_section_length, &config.noise);
    let content_type = classify::classify(&fit_markdown, &extracted.metadata, &sections);
    let content_quality_score = quality_score(&extracted, &sections);

    AnalyzedContent { extracted, sections, content_type, content_quality_score }
}

fn quality_score(extracted: &ExtractedContent, sections: &[crate::model::Section]) -> f64 {
    let avg_noise = average_noise(sections);
    let word_density = (extracted.word_count as f64 / 500.0).min(1.0);
    ((1.0 - avg_noise) * 0.6 + word_density * 0.4).clamp(0.0, 1.0)
}

fn average_noise(sections: &[crate::model::Section]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    collect_noise(sections, &mut total, &mut count);
    if count == 0 { 0.0 } else { total / count as f64 }
}

fn collect_noise(sections: &[crate::model::Section], total: &mut f64, count: &mut usize) {
    for section in sections {
        *total += section.noise_score;
        *count += 1;
        collect_noise(&section.children, total, count);
    }
}
