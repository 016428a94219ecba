//! Inferred document structure: heading/paragraph counts, reading-time
//! estimate, and a complexity score. Uses the same `scraper`-selector idiom
//! as the rest of this module for consistency with `html_meta`/`schema_org`.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const WORDS_PER_MINUTE: f64 = 220.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentStructure {
    /// Heading level (1-6) → count of headings at that level.
    pub heading_counts: HashMap<u8, usize>,
    pub paragraph_count: usize,
    pub word_count: usize,
    pub reading_time_minutes: f64,
    /// 0 (simple) .. 1 (complex); blend of average sentence length and
    /// average word length, both normalized against typical prose.
    pub complexity_score: f64,
}

pub fn infer(document: &Html) -> DocumentStructure {
    let mut heading_counts = HashMap::new();
    for level in 1..=6u8 {
        let selector_str = format!("h{level}");
        let Ok(selector) = Selector::parse(&selector_str) else { continue };
        let count = document.select(&selector).count();
        if count > 0 {
            heading_counts.insert(level, count);
        }
    }

    let paragraph_count = Selector::parse("p").ok().map(|s| document.select(&s).count()).unwrap_or(0);

    let body_text: String = document.root_element().text().collect();
    let words: Vec<&str> = body_text.split_whitespace().collect();
    let word_count = words.len();
    let reading_time_minutes = (word_count as f64 / WORDS_PER_MINUTE).max(0.0);

    let complexity_score = complexity(&body_text, &words);

    DocumentStructure { heading_counts, paragraph_count, word_count, reading_time_minutes, complexity_score }
}

fn complexity(text: &str, words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let avg_word_len = words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64;
    let sentence_count = text.matches(['.', '!', '?']).count().max(1);
    let avg_sentence_len = words.len() as f64 / sentence_count as f64;

    // Normalize against "typical" prose (avg word 5 chars, avg sentence 20 words).
    let word_factor = (avg_word_len / 5.0).min(2.0) / 2.0;
    let sentence_factor = (avg_sentence_len / 20.0).min(2.0) / 2.0;
    ((word_factor + sentence_factor) / 2.0).clamp(0.0, 1.0)
}
