//! Strategy-specific prompt templates, plain format strings, no templating
//! engine, matching `metadata::ai_augment`.

use super::{EnrichSection, RewriteStyle};

pub(super) fn summarize_prompt(content: &str, target_chars: usize) -> String {
    format!(
        "Summarize the following content in approximately {target_chars} characters, preserving the key facts and structure:\n\n{content}"
    )
}

pub(super) fn expand_prompt(content: &str, target_chars: usize) -> String {
    format!(
        "Expand the following content to approximately {target_chars} characters, adding clarifying detail without inventing facts:\n\n{content}"
    )
}

pub(super) fn rewrite_prompt(content: &str, style: RewriteStyle) -> String {
    let style_hint = match style {
        RewriteStyle::Formal => "a formal, professional tone",
        RewriteStyle::Casual => "a casual, conversational tone",
        RewriteStyle::Technical => "precise, technical language suited to a practitioner audience",
        RewriteStyle::Simple => "plain language a general reader can follow",
    };
    format!("Rewrite the following content in {style_hint}, preserving its meaning and structure:\n\n{content}")
}

pub(super) fn enrich_prompt(content: &str, sections: &[EnrichSection]) -> String {
    let section_names: Vec<&str> = sections.iter().map(enrich_section_label).collect();
    format!(
        "Enrich the following content by adding the following sections where relevant: {}. Keep the original content intact and append the new sections:\n\n{content}",
        section_names.join(", ")
    )
}

fn enrich_section_label(section: &EnrichSection) -> &'static str {
    match section {
        EnrichSection::Context => "Context",
        EnrichSection::Definitions => "Definitions",
        EnrichSection::Examples => "Examples",
        EnrichSection::RelatedInfo => "Related Information",
    }
}
