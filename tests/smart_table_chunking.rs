//! Smart chunking keeps a Markdown table intact as its own chunk, flagged
//! `has_table`, rather than splitting it mid-table.

use webreap::chunking::{chunk, ChunkingOptions, ChunkingStrategy};
use webreap::metadata;
use webreap::model::{AnalyzedContent, ContentType, ExtractedContent, QualityInfo, Section};

fn section(text: &str) -> Section {
    Section { heading_level: 1, text: text.to_string(), children: vec![], noise_score: 0.0 }
}

#[tokio::test]
async fn smart_chunking_preserves_tables() {
    let table_md = "| Name | Value |\n\
                     |---|---|\n\
                     | r1 | 1 |\n\
                     | r2 | 2 |\n\
                     | r3 | 3 |\n\
                     | r4 | 4 |\n\
                     | r5 | 5 |";

    let sections = vec![section("Text before the table."), section(table_md), section("Text after the table.")];
    let full_content = sections.iter().map(|s| s.text.clone()).collect::<Vec<_>>().join("\n\n");

    let extracted = ExtractedContent {
        url: "https://example.com".to_string(),
        title: "Title".to_string(),
        main_content: full_content.clone(),
        raw_markdown: full_content.clone(),
        fit_markdown: full_content,
        word_count: 0,
        language: Some("en".to_string()),
        image_urls: vec![],
        link_urls: vec![],
        metadata: metadata::extract("<html></html>"),
        quality_info: QualityInfo::default(),
    };
    let analyzed = AnalyzedContent { extracted, sections, content_type: ContentType::Article, content_quality_score: 0.5 };
    let options = ChunkingOptions { max_size: 1000, min_size: 1, overlap: 0, ..ChunkingOptions::default() };

    let chunks = chunk(&analyzed, ChunkingStrategy::Smart, &options, None, None).await;

    let table_chunks: Vec<_> = chunks.iter().filter(|c| c.metadata.has_table).collect();
    assert_eq!(table_chunks.len(), 1, "exactly one chunk should be flagged as a table");

    let table_chunk = table_chunks[0];
    let row_lines = table_chunk.content.lines().filter(|l| l.trim_start().starts_with('|')).count();
    assert_eq!(row_lines, 7, "header + separator + 5 data rows");
}
