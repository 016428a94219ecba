//! Semantic strategy: slide a window over paragraph embeddings, starting a
//! new chunk when cosine similarity to the running centroid drops below
//! `semantic_threshold` or the chunk reaches `max_size`.

use super::util::split_paragraphs;
use super::{ChunkDraft, ChunkingOptions};
use crate::capabilities::Embedding;
use crate::error::PreprocessError;

pub(super) async fn chunk(content: &str, options: &ChunkingOptions, embedding: &dyn Embedding) -> Result<Vec<ChunkDraft>, PreprocessError> {
    let paragraphs = split_paragraphs(content);
    let mut drafts = Vec::new();
    let mut current_text = String::new();
    let mut current_vectors: Vec<Vec<f32>> = Vec::new();

    for paragraph in paragraphs {
        let vector = embedding.embed(&paragraph).await?;

        if current_vectors.is_empty() {
            current_text = paragraph;
            current_vectors.push(vector);
            continue;
        }

        let centroid = centroid(&current_vectors);
        let similarity = cosine_similarity(&centroid, &vector);
        let would_overflow = current_text.chars().count() + paragraph.chars().count() > options.max_size;

        if similarity < options.semantic_threshold || would_overflow {
            drafts.push(ChunkDraft { content: std::mem::take(&mut current_text), heading_path: Vec::new() });
            current_vectors.clear();
            current_text = paragraph;
            current_vectors.push(vector);
        } else {
            current_text.push_str("\n\n");
            current_text.push_str(&paragraph);
            current_vectors.push(vector);
        }
    }

    if !current_text.trim().is_empty() {
        drafts.push(ChunkDraft { content: current_text, heading_path: Vec::new() });
    }

    Ok(drafts)
}

fn centroid(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dims = vectors.first().map_or(0, Vec::len);
    let mut out = vec![0.0_f32; dims];
    for vector in vectors {
        for (i, value) in vector.iter().enumerate() {
            out[i] += value;
        }
    }
    let count = vectors.len().max(1) as f32;
    for value in &mut out {
        *value /= count;
    }
    out
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    f64::from(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::embedding::fakes::HashEmbedding;

    #[tokio::test]
    async fn every_paragraph_appears_in_exactly_one_chunk() {
        let content = "alpha one.\n\nalpha two.\n\ncompletely different zzz topic here.";
        let embedding = HashEmbedding { dims: 16 };
        let options = ChunkingOptions { semantic_threshold: 0.99, max_size: 10_000, ..ChunkingOptions::default() };
        let drafts = chunk(content, &options, &embedding).await.unwrap();
        let joined: String = drafts.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join(" ");
        for paragraph in split_paragraphs(content) {
            assert!(joined.contains(paragraph.trim()));
        }
    }

    #[tokio::test]
    async fn respects_max_size_even_with_high_similarity() {
        let content = "same.\n\nsame.\n\nsame.";
        let embedding = HashEmbedding { dims: 8 };
        let options = ChunkingOptions { semantic_threshold: 0.0, max_size: 8, ..ChunkingOptions::default() };
        let drafts = chunk(content, &options, &embedding).await.unwrap();
        assert!(drafts.len() > 1);
    }
}
