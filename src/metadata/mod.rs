//! Metadata Extractor: merges basic `<meta>`, OpenGraph, Twitter Cards,
//! Dublin Core, Schema.org JSON-LD, and inferred document structure into
//! one report, with a seven-dimension quality score and optional
//! LLM-augmented field filling.

mod ai_augment;
mod html_meta;
mod schema_org;
mod structure;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use ai_augment::{augment, AugmentedMetadata, FieldSource, QualitySchema, SourcedField};
pub use html_meta::{BasicMeta, DublinCore, OpenGraph, TwitterCard};
pub use structure::DocumentStructure;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccessibilityInfo {
    pub has_lang_attribute: bool,
    /// Fraction of `<img>` elements carrying a non-empty `alt`, in [0,1].
    pub image_alt_coverage: f64,
    pub aria_label_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMetadata {
    pub basic: BasicMeta,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub dublin_core: DublinCore,
    pub schema_org: Vec<Value>,
    pub structure: DocumentStructure,
    pub accessibility: AccessibilityInfo,
}

/// The seven dimensions the quality score and completeness report are
/// computed across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Basic,
    OpenGraph,
    Twitter,
    SchemaOrg,
    DublinCore,
    Structure,
    Accessibility,
}

impl Dimension {
    const ALL: [Dimension; 7] = [
        Dimension::Basic,
        Dimension::OpenGraph,
        Dimension::Twitter,
        Dimension::SchemaOrg,
        Dimension::DublinCore,
        Dimension::Structure,
        Dimension::Accessibility,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub dimension_scores: std::collections::HashMap<String, f64>,
    pub missing_critical_fields: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Parse and merge metadata from a page's HTML (pure, no network/LLM).
pub fn extract(html: &str) -> ExtractedMetadata {
    let document = Html::parse_document(html);
    ExtractedMetadata {
        basic: html_meta::extract_basic(&document),
        open_graph: html_meta::extract_open_graph(&document),
        twitter: html_meta::extract_twitter(&document),
        dublin_core: html_meta::extract_dublin_core(&document),
        schema_org: schema_org::extract_json_ld(&document),
        structure: structure::infer(&document),
        accessibility: extract_accessibility(&document),
    }
}

fn extract_accessibility(document: &Html) -> AccessibilityInfo {
    let has_lang_attribute = Selector::parse("html[lang]").ok().is_some_and(|s| document.select(&s).next().is_some());

    let image_alt_coverage = Selector::parse("img").ok().map_or(0.0, |selector| {
        let images: Vec<_> = document.select(&selector).collect();
        if images.is_empty() {
            return 1.0;
        }
        let with_alt = images.iter().filter(|el| el.value().attr("alt").is_some_and(|a| !a.trim().is_empty())).count();
        with_alt as f64 / images.len() as f64
    });

    let aria_label_count = Selector::parse("[aria-label]").ok().map_or(0, |s| document.select(&s).count());

    AccessibilityInfo { has_lang_attribute, image_alt_coverage, aria_label_count }
}

fn dimension_score(metadata: &ExtractedMetadata, dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Basic => {
            let fields = [
                metadata.basic.title.is_some(),
                metadata.basic.description.is_some(),
                metadata.basic.keywords.is_some(),
                metadata.basic.author.is_some(),
                metadata.basic.canonical_url.is_some(),
            ];
            presence_ratio(&fields)
        }
        Dimension::OpenGraph => {
            let fields = [
                metadata.open_graph.title.is_some(),
                metadata.open_graph.description.is_some(),
                metadata.open_graph.image.is_some(),
                metadata.open_graph.og_type.is_some(),
            ];
            presence_ratio(&fields)
        }
        Dimension::Twitter => {
            let fields = [metadata.twitter.card.is_some(), metadata.twitter.title.is_some(), metadata.twitter.image.is_some()];
            presence_ratio(&fields)
        }
        Dimension::SchemaOrg => {
            if metadata.schema_org.is_empty() { 0.0 } else { 1.0 }
        }
        Dimension::DublinCore => {
            let fields = [metadata.dublin_core.title.is_some(), metadata.dublin_core.creator.is_some(), metadata.dublin_core.date.is_some()];
            presence_ratio(&fields)
        }
        Dimension::Structure => {
            let has_headings = !metadata.structure.heading_counts.is_empty();
            let has_paragraphs = metadata.structure.paragraph_count > 0;
            presence_ratio(&[has_headings, has_paragraphs])
        }
        Dimension::Accessibility => {
            let fields_score = if metadata.accessibility.has_lang_attribute { 1.0 } else { 0.0 };
            ((fields_score + metadata.accessibility.image_alt_coverage) / 2.0).clamp(0.0, 1.0)
        }
    }
}

fn presence_ratio(fields: &[bool]) -> f64 {
    if fields.is_empty() {
        return 0.0;
    }
    fields.iter().filter(|present| **present).count() as f64 / fields.len() as f64
}

/// Weighted sum of presence across the seven dimensions, in [0,1].
pub fn quality_score(metadata: &ExtractedMetadata) -> f64 {
    let weight = 1.0 / Dimension::ALL.len() as f64;
    Dimension::ALL.iter().map(|d| dimension_score(metadata, *d) * weight).sum()
}

/// Per-dimension scores plus missing critical fields and recommendations.
pub fn completeness(metadata: &ExtractedMetadata) -> CompletenessReport {
    let mut dimension_scores = std::collections::HashMap::new();
    for dimension in Dimension::ALL {
        dimension_scores.insert(dimension_label(dimension).to_string(), dimension_score(metadata, dimension));
    }

    let mut missing_critical_fields = Vec::new();
    let mut recommendations = Vec::new();

    if metadata.basic.title.is_none() {
        missing_critical_fields.push("title".to_string());
        recommendations.push("add a <title> element".to_string());
    }
    if metadata.basic.description.is_none() {
        missing_critical_fields.push("description".to_string());
        recommendations.push("add a <meta name=\"description\"> tag".to_string());
    }
    if metadata.open_graph.title.is_none() || metadata.open_graph.image.is_none() {
        missing_critical_fields.push("og:title/og:image".to_string());
        recommendations.push("add OpenGraph tags for richer social-media previews".to_string());
    }
    if metadata.schema_org.is_empty() {
        recommendations.push("add Schema.org JSON-LD structured data".to_string());
    }
    if !metadata.accessibility.has_lang_attribute {
        missing_critical_fields.push("html[lang]".to_string());
        recommendations.push("set a lang attribute on <html>".to_string());
    }
    if metadata.accessibility.image_alt_coverage < 1.0 {
        recommendations.push("add alt text to all images".to_string());
    }

    CompletenessReport { dimension_scores, missing_critical_fields, recommendations }
}

fn dimension_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Basic => "basic",
        Dimension::OpenGraph => "openGraph",
        Dimension::Twitter => "twitter",
        Dimension::SchemaOrg => "schemaOrg",
        Dimension::DublinCore => "dublinCore",
        Dimension::Structure => "structure",
        Dimension::Accessibility => "accessibility",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICH_HTML: &str = r#"<html lang="en"><head>
        <title>Rich Page</title>
        <meta name="description" content="a rich test page">
        <meta name="keywords" content="rust, testing">
        <meta name="author" content="Ada">
        <link rel="canonical" href="https://example.com/rich">
        <meta property="og:title" content="Rich OG Title">
        <meta property="og:image" content="https://example.com/img.png">
        <meta property="og:type" content="article">
        <meta name="twitter:card" content="summary">
        <script type="application/ld+json">{"@type": "Article"}</script>
    </head><body>
        <h1>Heading</h1><p>Paragraph text here.</p>
        <img src="a.png" alt="a description">
    </body></html>"#;

    #[test]
    fn rich_page_scores_near_the_top() {
        let metadata = extract(RICH_HTML);
        let score = quality_score(&metadata);
        assert!(score > 0.8, "expected a high quality score, got {score}");
    }

    #[test]
    fn sparse_page_scores_low_and_lists_missing_fields() {
        let metadata = extract("<html><body><p>bare</p></body></html>");
        let score = quality_score(&metadata);
        assert!(score < 0.3, "expected a low quality score, got {score}");
        let report = completeness(&metadata);
        assert!(report.missing_critical_fields.contains(&"title".to_string()));
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn accessibility_dimension_reflects_alt_coverage() {
        let html = r#"<html lang="en"><body><img src="a.png"><img src="b.png" alt="ok"></body></html>"#;
        let metadata = extract(html);
        assert!((metadata.accessibility.image_alt_coverage - 0.5).abs() < 1e-9);
    }
}
