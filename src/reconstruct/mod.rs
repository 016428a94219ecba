//! Reconstructor: optional LLM-mediated rewrite, summarization, expansion,
//! or enrichment of analyzed content. Falls back to pass-through whenever
//! no LLM capability is configured, or the strategy is `None`, or the LLM
//! call itself fails partway — the pipeline never aborts on a
//! reconstruction failure (`PreprocessError::is_retryable` treats
//! `LlmError` as a fallback trigger rather than a hard stop).

mod prompts;

use crate::capabilities::{CompletionOptions, TextCompletion};
use crate::model::{AnalyzedContent, ReconstructMetrics, ReconstructStrategy, ReconstructedContent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewriteStyle {
    Formal,
    Casual,
    Technical,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnrichSection {
    Context,
    Definitions,
    Examples,
    RelatedInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructOptions {
    pub strategy: ReconstructStrategy,
    pub summary_ratio: f64,
    pub expansion_ratio: f64,
    pub style: RewriteStyle,
    pub enrich_sections: Vec<EnrichSection>,
    pub max_tokens: u32,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            strategy: ReconstructStrategy::None,
            summary_ratio: 0.3,
            expansion_ratio: 1.5,
            style: RewriteStyle::Technical,
            enrich_sections: vec![EnrichSection::Context, EnrichSection::Definitions],
            max_tokens: 2048,
        }
    }
}

/// Reconstruct `analyzed` per `options`. `llm` is `None` when no capability
/// was configured for this run.
pub async fn reconstruct(
    analyzed: AnalyzedContent,
    options: &ReconstructOptions,
    llm: Option<&dyn TextCompletion>,
) -> ReconstructedContent {
    let source_text = analyzed.extracted.fit_markdown.clone();

    if options.strategy == ReconstructStrategy::None {
        return pass_through(analyzed, source_text, Vec::new());
    }

    let Some(llm) = llm else {
        return pass_through(analyzed, source_text, vec!["no LLM capability configured; used pass-through".to_string()]);
    };

    let prompt = build_prompt(options, &source_text);
    let completion_options = CompletionOptions { max_tokens: options.max_tokens, temperature: 0.4, ..CompletionOptions::default() };

    match llm.complete(&prompt, &completion_options).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return pass_through(analyzed, source_text, vec!["LLM returned empty output; used pass-through".to_string()]);
            }
            let reconstructed_text = trimmed.to_string();
            let compression_ratio = char_ratio(&source_text, &reconstructed_text);
            let tokens_used = Some(estimate_tokens(&prompt) + estimate_tokens(&reconstructed_text));
            let metrics = ReconstructMetrics { quality: analyzed.content_quality_score, compression_ratio, tokens_used };
            ReconstructedContent {
                analyzed,
                reconstructed_text,
                strategy_used: options.strategy,
                used_llm: true,
                enhancements: vec![strategy_label(options.strategy).to_string()],
                metrics,
            }
        }
        Err(err) => pass_through(analyzed, source_text, vec![format!("llm call failed ({err}); fell back to pass-through")]),
    }
}

fn build_prompt(options: &ReconstructOptions, content: &str) -> String {
    match options.strategy {
        ReconstructStrategy::None => String::new(),
        ReconstructStrategy::Summarize => {
            let target = (content.chars().count() as f64 * options.summary_ratio).round() as usize;
            prompts::summarize_prompt(content, target.max(1))
        }
        ReconstructStrategy::Expand => {
            let target = (content.chars().count() as f64 * options.expansion_ratio).round() as usize;
            prompts::expand_prompt(content, target.max(1))
        }
        ReconstructStrategy::Rewrite => prompts::rewrite_prompt(content, options.style),
        ReconstructStrategy::Enrich => prompts::enrich_prompt(content, &options.enrich_sections),
    }
}

fn strategy_label(strategy: ReconstructStrategy) -> &'static str {
    match strategy {
        ReconstructStrategy::None => "none",
        ReconstructStrategy::Summarize => "summarized",
        ReconstructStrategy::Expand => "expanded",
        ReconstructStrategy::Rewrite => "rewritten",
        ReconstructStrategy::Enrich => "enriched",
    }
}

fn pass_through(analyzed: AnalyzedContent, text: String, enhancements: Vec<String>) -> ReconstructedContent {
    let quality = analyzed.content_quality_score;
    ReconstructedContent {
        analyzed,
        reconstructed_text: text,
        strategy_used: ReconstructStrategy::None,
        used_llm: false,
        enhancements,
        metrics: ReconstructMetrics { quality, compression_ratio: 1.0, tokens_used: None },
    }
}

fn char_ratio(original: &str, reconstructed: &str) -> f64 {
    let original_len = original.chars().count().max(1) as f64;
    reconstructed.chars().count() as f64 / original_len
}

/// Crude chars/4 heuristic; there is no tokenizer dependency in this crate.
fn estimate_tokens(text: &str) -> u32 {
    ((text.chars().count() as f64) / 4.0).ceil() as u32
}
