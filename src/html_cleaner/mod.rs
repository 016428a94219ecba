//! HTML Cleaner: select the main-content region, strip noise, and resolve
//! relative URLs. Configurable `content_selectors`/`keep_selectors` pair
//! with an explicit OnlyMainContent/KeepAll mode switch, rather than a
//! fixed selector list.

mod selectors;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::error::PreprocessError;

pub use selectors::{default_always_removed, default_content_selectors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    /// Select the best candidate main-content region (spec default).
    OnlyMainContent,
    /// Only remove explicitly-listed noise selectors.
    KeepAll,
}

#[derive(Debug, Clone)]
pub struct HtmlCleanerConfig {
    pub mode: CleanMode,
    /// Priority-ordered CSS selectors tried in OnlyMainContent mode.
    pub content_selectors: Vec<String>,
    /// Selectors that override the always-removed noise list.
    pub keep_selectors: Vec<String>,
    /// Minimum character count for the text-density fallback candidate.
    pub min_density_candidate_size: usize,
}

impl Default for HtmlCleanerConfig {
    fn default() -> Self {
        Self {
            mode: CleanMode::OnlyMainContent,
            content_selectors: default_content_selectors(),
            keep_selectors: Vec::new(),
            min_density_candidate_size: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanedHtml {
    pub html: String,
    /// Which content_selectors entry matched, or `None` if the density
    /// fallback or `<body>` fallback was used.
    pub matched_selector: Option<String>,
}

/// Clean `html` relative to `page_url` (used to resolve relative links).
pub fn clean(html: &str, page_url: &Url, config: &HtmlCleanerConfig) -> Result<CleanedHtml, PreprocessError> {
    let document = Html::parse_document(html);

    let (fragment_html, matched_selector) = match config.mode {
        CleanMode::OnlyMainContent => select_main_content(&document, config),
        CleanMode::KeepAll => (document.root_element().html(), None),
    };

    let fragment = Html::parse_fragment(&fragment_html);
    let root = fragment.root_element();

    let noise_selectors = effective_noise_selectors(config);
    let stripped = remove_matching(&root, &noise_selectors);

    let resolved = resolve_relative_urls(&stripped, page_url);
    let reduced = reduce_srcset(&resolved, page_url);

    Ok(CleanedHtml { html: reduced, matched_selector })
}

fn select_main_content(document: &Html, config: &HtmlCleanerConfig) -> (String, Option<String>) {
    for selector_str in &config.content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else { continue };
        if let Some(element) = document
            .select(&selector)
            .find(|e| !e.text().collect::<String>().trim().is_empty())
        {
            return (element.html(), Some(selector_str.clone()));
        }
    }

    if let Some(best) = text_density_candidate(document, config.min_density_candidate_size) {
        return (best, None);
    }

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return (body.html(), None);
        }
    }

    (document.root_element().html(), None)
}

/// Highest text/markup-ratio element above `min_size`, excluding `<script>`/`<style>`.
fn text_density_candidate(document: &Html, min_size: usize) -> Option<String> {
    let all = Selector::parse("div, section, article, main").ok()?;
    let mut best: Option<(f64, String)> = None;

    for el in document.select(&all) {
        let text: String = el.text().collect();
        let text_len = text.trim().len();
        if text_len < min_size {
            continue;
        }
        let markup_len = el.html().len().max(1);
        let density = text_len as f64 / markup_len as f64;
        if best.as_ref().is_none_or(|(best_density, _)| density > *best_density) {
            best = Some((density, el.html()));
        }
    }

    best.map(|(_, html)| html)
}

fn effective_noise_selectors(config: &HtmlCleanerConfig) -> Vec<String> {
    if config.keep_selectors.is_empty() {
        default_always_removed()
    } else {
        default_always_removed()
            .into_iter()
            .filter(|sel| !config.keep_selectors.contains(sel))
            .collect()
    }
}

fn remove_matching(element: &ElementRef, noise_selectors: &[String]) -> String {
    let parsed: Vec<Selector> = noise_selectors.iter().filter_map(|s| Selector::parse(s).ok()).collect();

    let mut to_remove: std::collections::HashSet<NodeId> = std::collections::HashSet::new();
    for selector in &parsed {
        for elem in element.select(selector) {
            to_remove.insert(elem.id());
        }
    }

    let mut out = String::new();
    serialize_excluding(element, &to_remove, &mut out);
    out
}

fn serialize_excluding(element: &ElementRef, to_remove: &std::collections::HashSet<NodeId>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
            Node::Element(_) => {
                let Some(child_elem) = ElementRef::wrap(child) else { continue };
                if to_remove.contains(&child_elem.id()) {
                    continue;
                }
                let name = child_elem.value().name();
                out.push('<');
                out.push_str(name);
                for (attr_name, attr_value) in child_elem.value().attrs() {
                    out.push(' ');
                    out.push_str(attr_name);
                    out.push_str("=\"");
                    out.push_str(&attr_value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');

                const VOID: &[&str] = &[
                    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
                    "source", "track", "wbr",
                ];
                if VOID.contains(&name) {
                    continue;
                }
                serialize_excluding(&child_elem, to_remove, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

/// Resolve relative `href`/`src` values against `base`. Operates on the
/// serialized HTML string via a lightweight DOM re-walk rather than
/// mutating in place (scraper's tree is not directly mutable).
fn resolve_relative_urls(html: &str, base: &Url) -> String {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    let mut out = String::new();
    rewrite_urls(&root, base, &mut out);
    out
}

fn rewrite_urls(element: &ElementRef, base: &Url, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
            Node::Element(_) => {
                let Some(child_elem) = ElementRef::wrap(child) else { continue };
                let name = child_elem.value().name();
                out.push('<');
                out.push_str(name);
                for (attr_name, attr_value) in child_elem.value().attrs() {
                    out.push(' ');
                    out.push_str(attr_name);
                    out.push_str("=\"");
                    if matches!(attr_name, "href" | "src") {
                        let resolved = base.join(attr_value).map(|u| u.to_string()).unwrap_or_else(|_| attr_value.to_string());
                        out.push_str(&resolved.replace('"', "&quot;"));
                    } else if attr_name == "srcset" {
                        out.push_str(&attr_value.replace('"', "&quot;"));
                    } else {
                        out.push_str(&attr_value.replace('"', "&quot;"));
                    }
                    out.push('"');
                }
                out.push('>');

                const VOID: &[&str] = &[
                    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
                    "source", "track", "wbr",
                ];
                if VOID.contains(&name) {
                    continue;
                }
                rewrite_urls(&child_elem, base, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

/// Reduce each `srcset` to its highest-density candidate, resolving the
/// winning URL against `base`.
fn reduce_srcset(html: &str, base: &Url) -> String {
    let Ok(re) = regex::Regex::new(r#"srcset="([^"]*)""#) else { return html.to_string() };
    re.replace_all(html, |caps: &regex::Captures| {
        let candidates = &caps[1];
        let best = candidates
            .split(',')
            .filter_map(|c| {
                let c = c.trim();
                let mut parts = c.rsplitn(2, ' ');
                let descriptor = parts.next()?;
                let url = parts.next().unwrap_or(c).trim();
                let density: f64 = descriptor
                    .trim_end_matches(['x', 'w'])
                    .parse()
                    .unwrap_or(1.0);
                Some((density, url.to_string()))
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        match best {
            Some((_, url)) => {
                let resolved = base.join(&url).map(|u| u.to_string()).unwrap_or(url);
                format!(r#"src="{resolved}""#)
            }
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}
