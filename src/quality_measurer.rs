//! Quality Measurer: a deterministic, side-effect-free post-hoc
//! metric used by the test harness to score an extraction against its
//! source HTML. Never consulted by the production pipeline itself —
//! deliberately decoupled from the Analyzer's own noise/structure scoring
//! so it stays an independent check on the pipeline's output.

use scraper::{Html, Selector};

use crate::model::ExtractedContent;

const STRUCTURE_WEIGHT: f64 = 0.25;
const CONTENT_WEIGHT: f64 = 0.35;
const NOISE_WEIGHT: f64 = 0.25;
const MARKDOWN_VALIDITY_WEIGHT: f64 = 0.15;

const BOILERPLATE_PHRASES: &[&str] =
    &["all rights reserved", "cookie policy", "subscribe to our newsletter", "skip to content", "back to top"];

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub structure_score: f64,
    pub content_score: f64,
    pub noise_score: f64,
    pub markdown_validity_score: f64,
    pub overall_score: f64,
}

/// Score `extracted` against the `original_html` it was produced from.
pub fn measure(extracted: &ExtractedContent, original_html: &str) -> QualityReport {
    let original = Html::parse_document(original_html);

    let structure_score = structure_score(extracted, &original);
    let content_score = content_score(extracted, &original);
    let noise_score = noise_score(&extracted.fit_markdown);
    let markdown_validity_score = markdown_validity_score(&extracted.main_content);

    let overall_score = structure_score * STRUCTURE_WEIGHT
        + content_score * CONTENT_WEIGHT
        + noise_score * NOISE_WEIGHT
        + markdown_validity_score * MARKDOWN_VALIDITY_WEIGHT;

    QualityReport { structure_score, content_score, noise_score, markdown_validity_score, overall_score }
}

fn structure_score(extracted: &ExtractedContent, original: &Html) -> f64 {
    let original_headings = count_matches(original, "h1, h2, h3, h4, h5, h6");
    let original_paragraphs = count_matches(original, "p");

    let retained_headings: usize = extracted.metadata.structure.heading_counts.values().sum();
    let retained_paragraphs = extracted.metadata.structure.paragraph_count;

    (ratio(retained_headings, original_headings) + ratio(retained_paragraphs, original_paragraphs)) / 2.0
}

fn content_score(extracted: &ExtractedContent, original: &Html) -> f64 {
    let original_words = original.root_element().text().collect::<Vec<_>>().join(" ").split_whitespace().count();
    let retained_ratio = ratio(extracted.word_count, original_words);
    let richness = (extracted.word_count as f64 / 300.0).min(1.0);
    retained_ratio * 0.5 + richness * 0.5
}

fn noise_score(markdown: &str) -> f64 {
    let lines: Vec<&str> = markdown.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return 1.0;
    }
    let noisy = lines.iter().filter(|line| is_boilerplate(line)).count();
    1.0 - (noisy as f64 / lines.len() as f64)
}

fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    BOILERPLATE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn markdown_validity_score(markdown: &str) -> f64 {
    let mut passed = 0u32;
    const TOTAL_CHECKS: u32 = 4;

    if markdown.matches("```").count() % 2 == 0 {
        passed += 1;
    }
    if !markdown.contains("]()") {
        passed += 1;
    }
    if !markdown.contains("![]()") {
        passed += 1;
    }
    if !markdown.contains("\n\n\n\n") {
        passed += 1;
    }

    f64::from(passed) / f64::from(TOTAL_CHECKS)
}

fn count_matches(document: &Html, selector: &str) -> usize {
    Selector::parse(selector).ok().map_or(0, |s| document.select(&s).count())
}

fn ratio(retained: usize, original: usize) -> f64 {
    if original == 0 {
        1.0
    } else {
        (retained as f64 / original as f64).min(1.0)
    }
}
