//! Chunking Strategies: six strategies plus an `Auto` selector, sharing one
//! options contract and one quality-scoring pass. Operates on
//! `AnalyzedContent` rather than bare `ExtractedContent`, since
//! structure-aware strategies (Smart, Intelligent's fallback) need the
//! Analyzer's section tree.

mod fixed_size;
mod intelligent;
mod memory_optimized;
mod paragraph;
mod quality;
mod semantic;
mod smart;
mod util;

use uuid::Uuid;

use crate::capabilities::{Embedding, TextCompletion};
use crate::model::{AnalyzedContent, Chunk, ChunkMetadata, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkingStrategy {
    FixedSize,
    Paragraph,
    Smart,
    Semantic,
    Intelligent,
    MemoryOptimized,
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingOptions {
    pub max_size: usize,
    pub min_size: usize,
    pub overlap: usize,
    pub language: Option<String>,
    pub preserve_headers: bool,
    pub split_tables: bool,
    pub split_code_blocks: bool,
    pub semantic_threshold: f64,
    pub memory_threshold_bytes: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_size: 1000,
            min_size: 100,
            overlap: 50,
            language: None,
            preserve_headers: true,
            split_tables: false,
            split_code_blocks: false,
            semantic_threshold: 0.7,
            memory_threshold_bytes: 5 * 1024 * 1024,
        }
    }
}

struct ChunkDraft {
    content: String,
    heading_path: Vec<String>,
}

/// Chunk `analyzed` per `strategy`/`options`. `Auto` resolves to a concrete
/// strategy via heuristics; `Semantic`/`Intelligent` fall back to
/// `Paragraph`/`Smart` respectively when the capability is absent or the
/// call fails/validates badly.
pub async fn chunk(
    analyzed: &AnalyzedContent,
    strategy: ChunkingStrategy,
    options: &ChunkingOptions,
    embedding: Option<&dyn Embedding>,
    llm: Option<&dyn TextCompletion>,
) -> Vec<Chunk> {
    let content = &analyzed.extracted.fit_markdown;
    let resolved = if strategy == ChunkingStrategy::Auto { auto_select(analyzed, options, embedding.is_some()) } else { strategy };

    let drafts = match resolved {
        ChunkingStrategy::FixedSize => fixed_size::chunk(content, options),
        ChunkingStrategy::Paragraph => paragraph::chunk(content, options),
        ChunkingStrategy::Smart => smart::chunk(&analyzed.sections, options),
        ChunkingStrategy::MemoryOptimized => memory_optimized::chunk(content, options),
        ChunkingStrategy::Semantic => match embedding {
            Some(embedding) => match semantic::chunk(content, options, embedding).await {
                Ok(drafts) => drafts,
                Err(_) => paragraph::chunk(content, options),
            },
            None => paragraph::chunk(content, options),
        },
        ChunkingStrategy::Intelligent => match llm {
            Some(llm) => match intelligent::chunk(content, options, llm).await {
                Ok(drafts) => drafts,
                Err(_) => smart::chunk(&analyzed.sections, options),
            },
            None => smart::chunk(&analyzed.sections, options),
        },
        ChunkingStrategy::Auto => unreachable!("Auto is resolved before dispatch"),
    };

    finalize(drafts)
}

fn auto_select(analyzed: &AnalyzedContent, options: &ChunkingOptions, has_embedding: bool) -> ChunkingStrategy {
    let content_len = analyzed.extracted.fit_markdown.len();
    if content_len > options.memory_threshold_bytes {
        return ChunkingStrategy::MemoryOptimized;
    }

    let heading_count: usize = analyzed.sections.iter().map(count_headings).sum();
    if heading_count >= 3 {
        return ChunkingStrategy::Smart;
    }

    if has_embedding && content_len > options.max_size * 3 {
        return ChunkingStrategy::Semantic;
    }

    ChunkingStrategy::Paragraph
}

fn count_headings(section: &Section) -> usize {
    1 + section.children.iter().map(count_headings).sum::<usize>()
}

fn finalize(drafts: Vec<ChunkDraft>) -> Vec<Chunk> {
    let run_id = Uuid::new_v4();
    let mut chunks: Vec<Chunk> = drafts
        .into_iter()
        .enumerate()
        .map(|(sequence, draft)| {
            let has_code = draft.content.contains("```");
            let has_table = draft.content.lines().any(|line| line.trim_start().starts_with('|'));
            Chunk {
                id: format!("{run_id}-{sequence}"),
                sequence,
                content: draft.content,
                metadata: ChunkMetadata { heading_path: draft.heading_path, has_code, has_table, extra: Default::default() },
                quality_score: 0.0,
            }
        })
        .collect();

    quality::score_all(&mut chunks);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata;
    use crate::model::{ContentType, ExtractedContent, QualityInfo};

    fn sample_analyzed(content: &str, sections: Vec<Section>) -> AnalyzedContent {
        let extracted = ExtractedContent {
            url: "https://example.com".to_string(),
            title: "Title".to_string(),
            main_content: content.to_string(),
            raw_markdown: content.to_string(),
            fit_markdown: content.to_string(),
            word_count: content.split_whitespace().count(),
            language: Some("en".to_string()),
            image_urls: vec![],
            link_urls: vec![],
            metadata: metadata::extract("<html></html>"),
            quality_info: QualityInfo::default(),
        };
        AnalyzedContent { extracted, sections, content_type: ContentType::Article, content_quality_score: 0.5 }
    }

    #[tokio::test]
    async fn sequence_numbers_are_monotonic_and_ids_unique() {
        let content = "one.\n\ntwo.\n\nthree.\n\nfour.";
        let analyzed = sample_analyzed(content, vec![]);
        let options = ChunkingOptions { max_size: 6, ..ChunkingOptions::default() };
        let chunks = chunk(&analyzed, ChunkingStrategy::Paragraph, &options, None, None).await;
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.sequence, i);
        }
        let mut ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }

    #[tokio::test]
    async fn auto_picks_smart_for_heavily_headed_documents() {
        let sections = vec![
            Section { heading_level: 1, text: "# A\n\nbody a".to_string(), children: vec![], noise_score: 0.0 },
            Section { heading_level: 1, text: "# B\n\nbody b".to_string(), children: vec![], noise_score: 0.0 },
            Section { heading_level: 1, text: "# C\n\nbody c".to_string(), children: vec![], noise_score: 0.0 },
        ];
        let analyzed = sample_analyzed("# A\n\nbody a\n\n# B\n\nbody b\n\n# C\n\nbody c", sections);
        let options = ChunkingOptions::default();
        assert_eq!(auto_select(&analyzed, &options, false), ChunkingStrategy::Smart);
    }

    #[tokio::test]
    async fn missing_capability_falls_back_gracefully() {
        let analyzed = sample_analyzed("just plain prose here with no headings at all.", vec![]);
        let options = ChunkingOptions::default();
        let chunks = chunk(&analyzed, ChunkingStrategy::Semantic, &options, None, None).await;
        assert!(!chunks.is_empty());
    }

    proptest::proptest! {
        /// Invariants 4 and 9: sequence numbers are 0..n-1 strictly
        /// increasing, and every chunk's quality score lands in [0, 1],
        /// regardless of how the input paragraphs are shaped.
        #[test]
        fn prop_sequence_and_quality_score_hold(
            paragraphs in proptest::collection::vec("[a-zA-Z0-9 ]{1,80}", 1..12),
            max_size in 20usize..200,
        ) {
            let content = paragraphs.join("\n\n");
            let analyzed = sample_analyzed(&content, vec![]);
            let options = ChunkingOptions { max_size, min_size: (max_size / 4).max(1), overlap: 0, ..ChunkingOptions::default() };

            let runtime = tokio::runtime::Runtime::new().unwrap();
            let chunks = runtime.block_on(chunk(&analyzed, ChunkingStrategy::Paragraph, &options, None, None));

            for (i, c) in chunks.iter().enumerate() {
                proptest::prop_assert_eq!(c.sequence, i);
                proptest::prop_assert!(c.quality_score >= 0.0 && c.quality_score <= 1.0);
            }
        }
    }
}
