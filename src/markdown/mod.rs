//! Markdown Converter: structure-preserving HTML → Markdown, authored
//! directly against the `htmd` crate's handler API with a small set of
//! per-tag handlers plus the structurally-necessary passthroughs.

mod lists;
mod postprocess;
mod tables;

use htmd::element_handler::{HandlerResult, Handlers};
use htmd::{Element, HtmlToMarkdown};
use markup5ever_rcdom::NodeData;
use std::rc::Rc;
use url::Url;

use crate::error::PreprocessError;

#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Resolve relative `href`/`src` against this URL before emitting Markdown.
    /// Links and images are required to stay absolute.
    pub base_url: Option<Url>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { base_url: None }
    }
}

/// Convert a cleaned HTML fragment to Markdown, enforcing the output
/// invariants (blank-line cap, no broken links, no residual HTML tags).
pub fn convert(html: &str, config: &MarkdownConfig) -> Result<String, PreprocessError> {
    let base = config.base_url.clone();
    let converter = build_converter(base);
    let raw = converter
        .convert(html)
        .map_err(|e| PreprocessError::ParseError(format!("markdown conversion failed: {e}")))?;
    Ok(postprocess::finalize(&raw))
}

fn build_converter(base_url: Option<Url>) -> HtmlToMarkdown {
    let base_for_links = base_url.clone();
    let base_for_images = base_url;

    HtmlToMarkdown::builder()
        .add_handler(vec!["p"], paragraph_handler)
        .add_handler(vec!["h1", "h2", "h3", "h4", "h5", "h6"], heading_handler)
        .add_handler(vec!["blockquote"], blockquote_handler)
        .add_handler(vec!["pre"], pre_handler)
        .add_handler(vec!["code"], code_handler)
        .add_handler(vec!["strong", "b"], strong_handler)
        .add_handler(vec!["em", "i"], em_handler)
        .add_handler(vec!["br"], br_handler)
        .add_handler(vec!["a"], move |h: &dyn Handlers, el: Element| link_handler(h, el, base_for_links.as_ref()))
        .add_handler(vec!["img"], move |h: &dyn Handlers, el: Element| image_handler(h, el, base_for_images.as_ref()))
        .add_handler(vec!["ul"], lists::unordered_list_handler)
        .add_handler(vec!["ol"], lists::ordered_list_handler)
        .add_handler(vec!["li"], lists::list_item_handler)
        .add_handler(vec!["table"], tables::table_handler)
        .add_handler(vec!["div", "span", "section", "article", "main"], passthrough_handler)
        .build()
}

fn paragraph_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(HandlerResult::from(format!("\n\n{content}\n\n")))
}

fn heading_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let level = heading_level(&element.node)?;
    let content = handlers.walk_children(element.node).content;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    let prefix = "#".repeat(level);
    Some(HandlerResult::from(format!("\n\n{prefix} {content}\n\n")))
}

fn heading_level(node: &Rc<markup5ever_rcdom::Node>) -> Option<usize> {
    let NodeData::Element { ref name, .. } = node.data else { return None };
    match &*name.local {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// `> ` prefix on every line, including lines from nested block content.
fn blockquote_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    let quoted = content
        .lines()
        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
        .collect::<Vec<_>>()
        .join("\n");
    Some(HandlerResult::from(format!("\n\n{quoted}\n\n")))
}

fn pre_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let inner = handlers.walk_children(element.node).content;
    let inner = inner.trim_matches('\n');

    if inner.starts_with("```") {
        return Some(HandlerResult::from(format!("\n\n{inner}\n\n")));
    }

    let language = code_language(&element);
    let fence = match &language {
        Some(lang) => format!("```{lang}"),
        None => "```".to_string(),
    };
    Some(HandlerResult::from(format!("\n\n{fence}\n{inner}\n```\n\n")))
}

fn code_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let inside_pre = node_has_pre_ancestor(&element.node);
    let content = handlers.walk_children(element.node).content;
    let content = content.trim();

    if inside_pre {
        let language = code_language(&element);
        let fence = match &language {
            Some(lang) => format!("```{lang}"),
            None => "```".to_string(),
        };
        return Some(HandlerResult::from(format!("{fence}\n{content}\n```")));
    }

    if content.is_empty() {
        return None;
    }
    if content.contains('`') {
        Some(HandlerResult::from(format!("`` {content} ``")))
    } else {
        Some(HandlerResult::from(format!("`{content}`")))
    }
}

fn node_has_pre_ancestor(node: &Rc<markup5ever_rcdom::Node>) -> bool {
    let mut current = node.parent.take();
    node.parent.set(current.clone());
    while let Some(weak) = current {
        let Some(parent) = weak.upgrade() else { break };
        if let NodeData::Element { ref name, .. } = parent.data {
            if &*name.local == "pre" {
                return true;
            }
        }
        current = parent.parent.take();
        parent.parent.set(current.clone());
    }
    false
}

/// Language hint from `class="language-xxx"` or `data-language`; spec asks
/// only for the fence to carry a language "if available", not to guess one
/// from content.
fn code_language(element: &Element) -> Option<String> {
    if let Some(lang) = get_attr(element.attrs, "data-language") {
        return Some(lang);
    }
    let class = get_attr(element.attrs, "class")?;
    class
        .split_whitespace()
        .find_map(|token| token.strip_prefix("language-").or_else(|| token.strip_prefix("lang-")))
        .map(str::to_string)
}

fn strong_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let text = extract_text(&element.node);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(HandlerResult::from(format!("**{text}**")))
}

fn em_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let text = extract_text(&element.node);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(HandlerResult::from(format!("*{text}*")))
}

fn br_handler(_handlers: &dyn Handlers, _element: Element) -> Option<HandlerResult> {
    Some(HandlerResult::from("  \n".to_string()))
}

/// Empty `href` is dropped per spec's "no broken `[]()` links" invariant.
/// Relative hrefs are resolved against `base` to satisfy "URL kept absolute".
fn link_handler(_handlers: &dyn Handlers, element: Element, base: Option<&Url>) -> Option<HandlerResult> {
    let href = get_attr(element.attrs, "href").unwrap_or_default();
    let text = extract_text(&element.node);
    let text = text.trim();

    if href.is_empty() {
        return if text.is_empty() { None } else { Some(HandlerResult::from(text.to_string())) };
    }

    let resolved = resolve_url(&href, base);
    if text.is_empty() {
        return Some(HandlerResult::from(format!("<{resolved}>")));
    }
    Some(HandlerResult::from(format!("[{text}]({resolved})")))
}

fn image_handler(_handlers: &dyn Handlers, element: Element, base: Option<&Url>) -> Option<HandlerResult> {
    let src = get_attr(element.attrs, "src").unwrap_or_default();
    if src.is_empty() {
        return None;
    }
    let alt = get_attr(element.attrs, "alt").unwrap_or_default();
    let resolved = resolve_url(&src, base);
    Some(HandlerResult::from(format!("![{alt}]({resolved})")))
}

fn resolve_url(raw: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base.join(raw).map(|u| u.to_string()).unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

/// Unknown/structural tags (spec's "pass-through their text content").
fn passthrough_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    if content.trim().is_empty() {
        return None;
    }
    Some(HandlerResult::from(content))
}

pub(crate) fn extract_text(node: &Rc<markup5ever_rcdom::Node>) -> String {
    let mut out = String::new();
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document | NodeData::Doctype { .. } => {
            for child in node.children.borrow().iter() {
                out.push_str(&extract_text(child));
            }
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
    out
}

pub(crate) fn get_attr(attrs: &[html5ever::Attribute], name: &str) -> Option<String> {
    attrs.iter().find(|a| &*a.name.local == name).map(|a| a.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_preserve_level_and_text() {
        let md = convert("<h2>Title</h2>", &MarkdownConfig::default()).unwrap();
        assert!(md.contains("## Title"));
    }

    #[test]
    fn code_block_carries_language_from_class() {
        let html = r#"<pre><code class="language-rust">fn main() {}</code></pre>"#;
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("```rust"));
        assert!(md.contains("fn main() {}"));
    }

    #[test]
    fn empty_href_drops_the_link_wrapper() {
        let html = r#"<a href="">click here</a>"#;
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(!md.contains("[click here]"));
        assert!(md.contains("click here"));
    }

    #[test]
    fn relative_links_resolve_to_absolute() {
        let config = MarkdownConfig { base_url: Some(Url::parse("https://example.com/guide/").unwrap()) };
        let md = convert(r#"<a href="/docs">docs</a>"#, &config).unwrap();
        assert!(md.contains("[docs](https://example.com/docs)"));
    }

    #[test]
    fn images_become_markdown_image_syntax() {
        let html = r#"<img src="pic.png" alt="a cat">"#;
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("![a cat](pic.png)"));
    }

    #[test]
    fn blockquote_prefixes_every_line() {
        let html = "<blockquote><p>line one</p><p>line two</p></blockquote>";
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.lines().filter(|l| l.starts_with('>')).count() >= 2);
    }

    #[test]
    fn unknown_tags_pass_through_their_text() {
        let html = "<marquee>scrolling text</marquee>";
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("scrolling text"));
    }

    #[test]
    fn blank_lines_never_exceed_three_consecutive() {
        let html = "<p>a</p>\n\n\n\n\n\n<p>b</p>";
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(!md.contains("\n\n\n\n"));
    }
}
