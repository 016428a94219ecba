//! Optional AI-augmented extraction: fills metadata fields the HTML left
//! empty via an injected `TextCompletion` capability. Prompt templates are
//! plain format strings, no templating-engine dependency (mirrored by the
//! Reconstructor).

use serde::{Deserialize, Serialize};

use crate::capabilities::{CompletionOptions, TextCompletion};
use crate::error::PreprocessError;

use super::ExtractedMetadata;

/// Which schema the AI extractor should target when proposing fields.
#[derive(Debug, Clone, PartialEq)]
pub enum QualitySchema {
    General,
    TechnicalDoc,
    ProductManual,
    Article,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSource {
    Html,
    Ai,
    Merged,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcedField<T> {
    pub value: T,
    pub source: FieldSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AugmentedMetadata {
    pub description: Option<SourcedField<String>>,
    pub keywords: Option<SourcedField<Vec<String>>>,
    pub author: Option<SourcedField<String>>,
    pub summary: Option<SourcedField<String>>,
}

/// HTML-originated values always take precedence; the LLM only fills empty
/// slots, except for `keywords` where HTML and AI suggestions are unioned
/// and recorded as `Merged`.
pub async fn augment(
    metadata: &ExtractedMetadata,
    content_excerpt: &str,
    llm: &dyn TextCompletion,
    schema: &QualitySchema,
) -> Result<AugmentedMetadata, PreprocessError> {
    let options = CompletionOptions { max_tokens: 256, temperature: 0.3, ..CompletionOptions::default() };

    let html_description =
        metadata.basic.description.clone().or_else(|| metadata.open_graph.description.clone()).or_else(|| metadata.twitter.description.clone());

    let description = match html_description {
        Some(value) => Some(SourcedField { value, source: FieldSource::Html }),
        None => {
            let prompt = describe_prompt(schema, content_excerpt);
            let value = llm.complete(&prompt, &options).await?.trim().to_string();
            if value.is_empty() { None } else { Some(SourcedField { value, source: FieldSource::Ai }) }
        }
    };

    let html_keywords = metadata.basic.keywords.clone().unwrap_or_default();
    let keywords = {
        let prompt = keywords_prompt(schema, content_excerpt);
        let raw = llm.complete(&prompt, &options).await?;
        let suggested = parse_keyword_list(&raw);
        if suggested.is_empty() && html_keywords.is_empty() {
            None
        } else if suggested.is_empty() {
            Some(SourcedField { value: html_keywords, source: FieldSource::Html })
        } else if html_keywords.is_empty() {
            Some(SourcedField { value: suggested, source: FieldSource::Ai })
        } else {
            let mut merged = html_keywords.clone();
            for kw in suggested {
                if !merged.iter().any(|existing| existing.eq_ignore_ascii_case(&kw)) {
                    merged.push(kw);
                }
            }
            Some(SourcedField { value: merged, source: FieldSource::Merged })
        }
    };

    let html_author = metadata.basic.author.clone().or_else(|| metadata.dublin_core.creator.clone());
    let author = match html_author {
        Some(value) => Some(SourcedField { value, source: FieldSource::Html }),
        None => None,
    };

    let summary_prompt = summary_prompt(schema, content_excerpt);
    let summary_text = llm.complete(&summary_prompt, &options).await?.trim().to_string();
    let summary = if summary_text.is_empty() { None } else { Some(SourcedField { value: summary_text, source: FieldSource::Ai }) };

    Ok(AugmentedMetadata { description, keywords, author, summary })
}

fn schema_hint(schema: &QualitySchema) -> String {
    match schema {
        QualitySchema::General => "a general web page".to_string(),
        QualitySchema::TechnicalDoc => "a technical documentation page".to_string(),
        QualitySchema::ProductManual => "a product manual page".to_string(),
        QualitySchema::Article => "a news or blog article".to_string(),
        QualitySchema::Custom(prompt) => prompt.clone(),
    }
}

fn describe_prompt(schema: &QualitySchema, excerpt: &str) -> String {
    format!("The following is {}. Write a one-sentence meta description (<160 chars):\n\n{excerpt}", schema_hint(schema))
}

fn keywords_prompt(schema: &QualitySchema, excerpt: &str) -> String {
    format!("The following is {}. List 5-10 relevant keywords, comma separated, no other text:\n\n{excerpt}", schema_hint(schema))
}

fn summary_prompt(schema: &QualitySchema, excerpt: &str) -> String {
    format!("The following is {}. Summarize it in 2-3 sentences:\n\n{excerpt}", schema_hint(schema))
}

fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::llm::fakes::EchoLlm;
    use crate::metadata::{extract, ExtractedMetadata};

    fn sample() -> ExtractedMetadata {
        extract("<html><head><title>T</title></head><body><p>content</p></body></html>")
    }

    #[tokio::test]
    async fn html_description_wins_over_ai() {
        let mut metadata = sample();
        metadata.basic.description = Some("from html".to_string());
        let llm = EchoLlm { prefix: "ai: ".to_string() };
        let out = augment(&metadata, "content", &llm, &QualitySchema::General).await.unwrap();
        let description = out.description.unwrap();
        assert_eq!(description.source, FieldSource::Html);
        assert_eq!(description.value, "from html");
    }

    #[tokio::test]
    async fn keywords_merge_html_and_ai_suggestions() {
        let mut metadata = sample();
        metadata.basic.keywords = Some(vec!["rust".to_string()]);
        let llm = EchoLlm { prefix: String::new() };
        let out = augment(&metadata, "rust, web, async", &llm, &QualitySchema::General).await.unwrap();
        let keywords = out.keywords.unwrap();
        assert_eq!(keywords.source, FieldSource::Merged);
        assert!(keywords.value.contains(&"rust".to_string()));
    }
}
