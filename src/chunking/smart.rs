//! Smart strategy: structure-aware chunking over the Analyzer's section
//! tree. One chunk per leaf section, small leaves merged with their
//! predecessor until `min_size`, oversize leaves split paragraph → sentence
//! → word boundary.

use super::util::split_oversize;
use super::{ChunkDraft, ChunkingOptions};
use crate::model::Section;

pub(super) fn chunk(sections: &[Section], options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let mut drafts = Vec::new();
    let mut path = Vec::new();
    walk(sections, &mut path, options, &mut drafts);
    merge_small(&mut drafts, options.min_size);
    drafts
}

fn walk(sections: &[Section], path: &mut Vec<String>, options: &ChunkingOptions, out: &mut Vec<ChunkDraft>) {
    for section in sections {
        path.push(heading_title(section));

        if section.children.is_empty() {
            let text = section.text.trim();
            if !text.is_empty() {
                if text.chars().count() > options.max_size {
                    for piece in split_oversize(text, options.max_size, options.overlap) {
                        out.push(ChunkDraft { content: piece, heading_path: path.clone() });
                    }
                } else {
                    out.push(ChunkDraft { content: text.to_string(), heading_path: path.clone() });
                }
            }
        } else {
            walk(&section.children, path, options, out);
        }

        path.pop();
    }
}

fn heading_title(section: &Section) -> String {
    section.text.lines().next().unwrap_or_default().trim().to_string()
}

fn merge_small(drafts: &mut Vec<ChunkDraft>, min_size: usize) {
    let originals = std::mem::take(drafts);
    let mut merged: Vec<ChunkDraft> = Vec::new();
    for draft in originals {
        if draft.content.chars().count() < min_size {
            if let Some(prev) = merged.last_mut() {
                prev.content.push_str("\n\n");
                prev.content.push_str(&draft.content);
                continue;
            }
        }
        merged.push(draft);
    }
    *drafts = merged;
}
