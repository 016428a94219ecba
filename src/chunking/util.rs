//! Shared boundary-splitting helpers used by several strategies (spec
//! §4.J): paragraph/sentence/word-boundary fallbacks, applied in that order
//! whenever a unit of text exceeds `max_size`.

/// Split on blank-line boundaries, matching Markdown paragraph breaks.
pub(super) fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect()
}

/// Naive sentence boundary split: breaks after `.`/`!`/`?` followed by
/// whitespace. No dependency on a locale-aware sentence segmenter, matching
/// this crate's avoidance of NLP dependencies outside the capability traits.
pub(super) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|next| next.is_whitespace()) {
            sentences.push(current.trim().to_string());
            current = String::new();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Greedy word-boundary slicing at `max_size` characters, with `overlap`
/// characters of trailing carry-over into the next slice. Never splits
/// inside a word.
pub(super) fn word_boundary_slices(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let max_size = max_size.max(1);
    let mut slices = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + max_size).min(chars.len());
        if end < chars.len() {
            let mut boundary = end;
            while boundary > start && !chars[boundary].is_whitespace() {
                boundary -= 1;
            }
            if boundary > start {
                end = boundary;
            }
        }
        let slice: String = chars[start..end].iter().collect();
        let trimmed = slice.trim();
        if !trimmed.is_empty() {
            slices.push(trimmed.to_string());
        }
        if end >= chars.len() {
            break;
        }
        let next_start = end.saturating_sub(overlap);
        start = if next_start > start { next_start } else { end };
    }
    slices
}

/// Pack paragraph/sentence-sized pieces of `text` into chunks ≤ `max_size`
/// characters; any single piece still oversize is pushed through the
/// sentence, then word-boundary, fallback.
pub(super) fn split_oversize(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();

    for paragraph in split_paragraphs(text) {
        if paragraph.chars().count() > max_size {
            flush(&mut buf, &mut out);
            out.extend(split_oversize_unit(&paragraph, max_size, overlap));
            continue;
        }
        pack(&mut buf, &paragraph, max_size, &mut out);
    }
    flush(&mut buf, &mut out);
    out
}

fn split_oversize_unit(paragraph: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for sentence in split_sentences(paragraph) {
        if sentence.chars().count() > max_size {
            flush(&mut buf, &mut out);
            out.extend(word_boundary_slices(&sentence, max_size, overlap));
            continue;
        }
        pack(&mut buf, &sentence, max_size, &mut out);
    }
    flush(&mut buf, &mut out);
    out
}

fn pack(buf: &mut String, piece: &str, max_size: usize, out: &mut Vec<String>) {
    if !buf.is_empty() && buf.chars().count() + piece.chars().count() > max_size {
        flush(buf, out);
    }
    if !buf.is_empty() {
        buf.push_str("\n\n");
    }
    buf.push_str(piece);
}

fn flush(buf: &mut String, out: &mut Vec<String>) {
    if !buf.trim().is_empty() {
        out.push(std::mem::take(buf));
    } else {
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boundary_slices_never_splits_inside_a_word() {
        let text = "one two three four five six seven eight nine ten";
        let slices = word_boundary_slices(text, 12, 0);
        for slice in &slices {
            assert!(!text.contains(&format!("{slice}x")));
        }
        assert_eq!(slices.join(" ").split_whitespace().count(), text.split_whitespace().count());
    }

    #[test]
    fn split_oversize_falls_back_through_sentence_then_word_boundary() {
        let long_sentence = "word ".repeat(50);
        let paragraph = format!("{long_sentence}. Short second sentence.");
        let pieces = split_oversize(&paragraph, 40, 0);
        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| !p.is_empty()));
    }
}
