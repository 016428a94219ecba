//! Content-type classification: article, documentation, product, tutorial,
//! or blog, from metadata and structure signals. Plain conditionals over
//! already-extracted signals, no ML classifier dependency.

use crate::metadata::ExtractedMetadata;
use crate::model::{ContentType, Section};

const CODE_FENCE_MARKER: &str = "```";

pub fn classify(markdown: &str, metadata: &ExtractedMetadata, sections: &[Section]) -> ContentType {
    let lower = markdown.to_lowercase();
    let code_block_count = markdown.matches(CODE_FENCE_MARKER).count() / 2;
    let heading_count: usize = sections.iter().map(count_headings).sum();

    let og_type = metadata.open_graph.og_type.as_deref().unwrap_or_default().to_lowercase();

    if og_type.contains("product") || contains_any(&lower, &["add to cart", "buy now", "price:", "in stock"]) {
        return ContentType::Product;
    }

    if contains_any(&lower, &["step 1", "step-by-step", "in this tutorial", "follow along"]) {
        return ContentType::Tutorial;
    }

    if code_block_count >= 2 && heading_count >= 3 {
        return ContentType::Documentation;
    }

    if og_type.contains("article") || metadata.dublin_core.date.is_some() || contains_any(&lower, &["posted by", "published on"]) {
        return ContentType::Blog;
    }

    ContentType::Article
}

fn count_headings(section: &Section) -> usize {
    1 + section.children.iter().map(count_headings).sum::<usize>()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract;

    #[test]
    fn product_signals_win_over_everything_else() {
        let metadata = extract("<html></html>");
        let result = classify("Add to Cart now! Price: $9.99", &metadata, &[]);
        assert_eq!(result, ContentType::Product);
    }

    #[test]
    fn heavy_code_and_headings_classifies_as_documentation() {
        let metadata = extract("<html></html>");
        let sections = vec![
            Section { heading_level: 1, text: "a".into(), children: vec![], noise_score: 0.0 },
            Section { heading_level: 2, text: "b".into(), children: vec![], noise_score: 0.0 },
            Section { heading_level: 2, text: "c".into(), children: vec![], noise_score: 0.0 },
        ];
        let md = "```rust\nfn a() {}\n```\n\n```rust\nfn b() {}\n```\n";
        assert_eq!(classify(md, &metadata, &sections), ContentType::Documentation);
    }

    #[test]
    fn defaults_to_article() {
        let metadata = extract("<html></html>");
        assert_eq!(classify("just some plain prose", &metadata, &[]), ContentType::Article);
    }
}
