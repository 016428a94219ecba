//! Paragraph strategy: pack paragraphs up to `max_size`; an oversize
//! paragraph falls back to sentence/word splitting. Heading lines (when
//! `preserve_headers`) attach to the content of the next chunk rather than
//! forming a chunk of their own.

use super::util::{split_oversize, split_paragraphs};
use super::{ChunkDraft, ChunkingOptions};

pub(super) fn chunk(content: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let mut drafts = Vec::new();
    let mut buf = String::new();
    let mut pending_heading: Option<String> = None;

    for paragraph in split_paragraphs(content) {
        if options.preserve_headers && is_heading_line(&paragraph) {
            flush(&mut buf, &mut drafts);
            pending_heading = Some(paragraph);
            continue;
        }

        if paragraph.chars().count() > options.max_size {
            flush(&mut buf, &mut drafts);
            for piece in split_oversize(&paragraph, options.max_size, options.overlap) {
                drafts.push(ChunkDraft { content: with_heading(pending_heading.take(), piece), heading_path: Vec::new() });
            }
            continue;
        }

        if !buf.is_empty() && buf.chars().count() + paragraph.chars().count() > options.max_size {
            flush(&mut buf, &mut drafts);
        }
        if buf.is_empty() {
            if let Some(heading) = pending_heading.take() {
                buf.push_str(&heading);
                buf.push_str("\n\n");
            }
        } else {
            buf.push_str("\n\n");
        }
        buf.push_str(&paragraph);
    }
    flush(&mut buf, &mut drafts);
    drafts
}

fn with_heading(heading: Option<String>, content: String) -> String {
    match heading {
        Some(heading) => format!("{heading}\n\n{content}"),
        None => content,
    }
}

fn is_heading_line(paragraph: &str) -> bool {
    paragraph.lines().next().is_some_and(|line| line.trim_start().starts_with('#'))
}

fn flush(buf: &mut String, drafts: &mut Vec<ChunkDraft>) {
    if !buf.trim().is_empty() {
        drafts.push(ChunkDraft { content: std::mem::take(buf), heading_path: Vec::new() });
    } else {
        buf.clear();
    }
}
