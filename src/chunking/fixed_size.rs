//! FixedSize strategy: greedy word-boundary slicing, no structure
//! awareness. The fastest strategy, and the fallback word-level splitter
//! every other strategy bottoms out at.

use super::util::word_boundary_slices;
use super::{ChunkDraft, ChunkingOptions};

pub(super) fn chunk(content: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    word_boundary_slices(content, options.max_size, options.overlap)
        .into_iter()
        .map(|content| ChunkDraft { content, heading_path: Vec::new() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_respect_max_size_with_word_boundaries() {
        let content = "alpha beta gamma delta epsilon zeta eta theta";
        let options = ChunkingOptions { max_size: 15, overlap: 0, ..ChunkingOptions::default() };
        let drafts = chunk(content, &options);
        assert!(drafts.len() > 1);
        let total_words: usize = drafts.iter().map(|d| d.content.split_whitespace().count()).sum();
        assert_eq!(total_words, content.split_whitespace().count());
    }
}
