//! Chunk quality scoring: size-consistency (30%), semantic-completeness
//! (40%), structure-preservation (30%), each in [0,1] per chunk, blended to
//! a 0-100 `quality_score`.

use crate::model::Chunk;

const SENTENCE_TERMINATORS: [char; 5] = ['.', '!', '?', '"', ')'];

pub(super) fn score_all(chunks: &mut [Chunk]) {
    if chunks.is_empty() {
        return;
    }
    let avg = chunks.iter().map(|c| c.content.chars().count() as f64).sum::<f64>() / chunks.len() as f64;

    for chunk in chunks.iter_mut() {
        let size = chunk.content.chars().count() as f64;
        let size_consistency = if avg > 0.0 { (1.0 - (size - avg).abs() / avg).clamp(0.0, 1.0) } else { 1.0 };
        let semantic_completeness = f64::from(ends_with_terminator(&chunk.content));
        let structure_preservation = f64::from(!chunk.metadata.heading_path.is_empty());

        chunk.quality_score = (size_consistency * 0.3 + semantic_completeness * 0.4 + structure_preservation * 0.3) * 100.0;
    }
}

fn ends_with_terminator(content: &str) -> bool {
    content.trim_end().chars().last().is_some_and(|c| SENTENCE_TERMINATORS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChunkMetadata;

    fn chunk(content: &str, heading_path: Vec<String>) -> Chunk {
        Chunk {
            id: "c".to_string(),
            sequence: 0,
            content: content.to_string(),
            metadata: ChunkMetadata { heading_path, has_code: false, has_table: false, extra: Default::default() },
            quality_score: 0.0,
        }
    }

    #[test]
    fn sentence_ending_and_headings_raise_the_score() {
        let mut chunks = vec![chunk("a complete sentence.", vec!["H".to_string()]), chunk("a fragment", vec![])];
        score_all(&mut chunks);
        assert!(chunks[0].quality_score > chunks[1].quality_score);
    }

    #[test]
    fn scores_are_bounded_0_to_100() {
        let mut chunks = vec![chunk("short", vec![]), chunk("a much much longer chunk of text indeed.", vec!["H".to_string()])];
        score_all(&mut chunks);
        for c in &chunks {
            assert!((0.0..=100.0).contains(&c.quality_score));
        }
    }
}
