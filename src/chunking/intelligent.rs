//! Intelligent strategy: the LLM proposes chunk boundaries directly.
//! Boundary offsets are validated (monotonic, in-bounds, chunk sizes within
//! `[min_size, max_size]`); an invalid proposal is treated as an error so
//! the caller can fall back to Smart.

use super::{ChunkDraft, ChunkingOptions};
use crate::capabilities::{CompletionOptions, TextCompletion};
use crate::error::PreprocessError;

pub(super) async fn chunk(content: &str, options: &ChunkingOptions, llm: &dyn TextCompletion) -> Result<Vec<ChunkDraft>, PreprocessError> {
    let offsets = propose_boundaries(content, llm).await?;
    let char_count = content.chars().count();
    validate(&offsets, char_count, options)?;

    let chars: Vec<char> = content.chars().collect();
    let mut drafts = Vec::new();
    let mut start = 0usize;
    for end in offsets {
        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            drafts.push(ChunkDraft { content: piece.trim().to_string(), heading_path: Vec::new() });
        }
        start = end;
    }
    if start < chars.len() {
        let tail: String = chars[start..].iter().collect();
        if !tail.trim().is_empty() {
            drafts.push(ChunkDraft { content: tail.trim().to_string(), heading_path: Vec::new() });
        }
    }
    Ok(drafts)
}

async fn propose_boundaries(content: &str, llm: &dyn TextCompletion) -> Result<Vec<usize>, PreprocessError> {
    let prompt = format!(
        "The following document has {} characters. Propose chunk boundary offsets as a comma-separated, strictly increasing list of character indices, no other text:\n\n{content}",
        content.chars().count()
    );
    let options = CompletionOptions { max_tokens: 256, temperature: 0.0, ..CompletionOptions::default() };
    let response = llm.complete(&prompt, &options).await?;
    Ok(parse_offsets(&response))
}

fn parse_offsets(raw: &str) -> Vec<usize> {
    raw.split(',').filter_map(|piece| piece.trim().parse::<usize>().ok()).collect()
}

fn validate(offsets: &[usize], char_count: usize, options: &ChunkingOptions) -> Result<(), PreprocessError> {
    if offsets.is_empty() {
        return Err(PreprocessError::ParseError("LLM proposed no chunk boundaries".to_string()));
    }
    let mut previous = 0usize;
    for &offset in offsets {
        if offset <= previous || offset > char_count {
            return Err(PreprocessError::ParseError("LLM boundaries are not monotonically increasing / in bounds".to_string()));
        }
        let size = offset - previous;
        if size > options.max_size * 2 {
            return Err(PreprocessError::ParseError("LLM-proposed chunk exceeds the size bound".to_string()));
        }
        previous = offset;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::llm::fakes::{EchoLlm, FailingLlm};

    struct FixedLlm(String);

    #[async_trait::async_trait]
    impl TextCompletion for FixedLlm {
        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String, PreprocessError> {
            Ok(self.0.clone())
        }
        async fn complete_stream(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<futures::stream::BoxStream<'static, Result<String, PreprocessError>>, PreprocessError> {
            unimplemented!()
        }
        async fn complete_batch(&self, _prompts: &[String], _options: &CompletionOptions) -> Result<Vec<String>, PreprocessError> {
            unimplemented!()
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn health(&self) -> Result<crate::capabilities::HealthStatus, PreprocessError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn valid_boundaries_produce_chunks_in_order() {
        let content = "0123456789abcdefghij";
        let llm = FixedLlm("5,12".to_string());
        let options = ChunkingOptions { max_size: 20, ..ChunkingOptions::default() };
        let drafts = chunk(content, &options, &llm).await.unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].content, "01234");
    }

    #[tokio::test]
    async fn non_monotonic_boundaries_are_rejected() {
        let llm = FixedLlm("10,3".to_string());
        let options = ChunkingOptions { max_size: 20, ..ChunkingOptions::default() };
        let result = chunk("0123456789abcdef", &options, &llm).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn llm_failure_surfaces_as_an_error_for_the_caller_to_fall_back_on() {
        let llm = FailingLlm;
        let options = ChunkingOptions::default();
        let result = chunk("some content", &options, &llm).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn garbage_response_yields_no_offsets_and_is_rejected() {
        let llm = EchoLlm { prefix: "not a list".to_string() };
        let options = ChunkingOptions::default();
        let result = chunk("some content here", &options, &llm).await;
        assert!(result.is_err());
    }
}
