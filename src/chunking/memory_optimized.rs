//! MemoryOptimized strategy: emits chunks from a bounded sliding window
//! over the input rather than materializing intermediate paragraph/sentence
//! structures for the whole document, used once input size crosses
//! `memory_threshold_bytes`.

use super::{ChunkDraft, ChunkingOptions};

pub(super) fn chunk(content: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let max_size = options.max_size.max(1);
    let mut drafts = Vec::new();
    let mut window = String::new();
    let mut window_len = 0usize;
    let mut carry = String::new();

    for word in content.split_whitespace() {
        let additional = word.chars().count() + usize::from(!window.is_empty());
        if window_len + additional > max_size && !window.is_empty() {
            drafts.push(ChunkDraft { content: std::mem::take(&mut window), heading_path: Vec::new() });
            window_len = 0;
            if options.overlap > 0 {
                window.push_str(&carry);
                window_len = window.chars().count();
            }
        }
        if !window.is_empty() {
            window.push(' ');
            window_len += 1;
        }
        window.push_str(word);
        window_len += word.chars().count();

        carry = tail_chars(&window, options.overlap);
    }

    if !window.trim().is_empty() {
        drafts.push(ChunkDraft { content: window, heading_path: Vec::new() });
    }

    drafts
}

fn tail_chars(text: &str, count: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(count);
    chars[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_multiple_bounded_windows() {
        let content = "word ".repeat(500);
        let options = ChunkingOptions { max_size: 50, overlap: 0, ..ChunkingOptions::default() };
        let drafts = chunk(&content, &options);
        assert!(drafts.len() > 1);
        for draft in &drafts {
            assert!(draft.content.chars().count() <= 60);
        }
    }

    #[test]
    fn preserves_every_word() {
        let content = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let options = ChunkingOptions { max_size: 20, overlap: 0, ..ChunkingOptions::default() };
        let drafts = chunk(content, &options);
        let total_words: usize = drafts.iter().map(|d| d.content.split_whitespace().count()).sum();
        assert_eq!(total_words, content.split_whitespace().count());
    }
}
