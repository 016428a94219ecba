//! Basic `<meta>`, OpenGraph (`og:*`), Twitter Cards (`twitter:*`), and
//! Dublin Core (`dc.*`) extraction. A pure static-HTML `scraper` pass, no
//! browser or JS execution involved.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BasicMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub author: Option<String>,
    pub canonical_url: Option<String>,
    pub language: Option<String>,
    pub robots: Option<String>,
    pub viewport: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub og_type: Option<String>,
    pub site_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TwitterCard {
    pub card: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DublinCore {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub extra: HashMap<String, String>,
}

pub fn extract_basic(document: &Html) -> BasicMeta {
    let title = select_text(document, "title");
    let mut meta = BasicMeta { title, ..Default::default() };

    for (name, value) in meta_name_pairs(document) {
        match name.as_str() {
            "description" => meta.description = Some(value),
            "keywords" => meta.keywords = Some(split_list(&value)),
            "author" => meta.author = Some(value),
            "robots" => meta.robots = Some(value),
            "viewport" => meta.viewport = Some(value),
            _ => {}
        }
    }

    if let Some(lang) = select_attr(document, "html", "lang") {
        meta.language = Some(lang);
    }
    if let Some(href) = select_attr(document, r#"link[rel="canonical"]"#, "href") {
        meta.canonical_url = Some(href);
    }

    meta
}

pub fn extract_open_graph(document: &Html) -> OpenGraph {
    let mut og = OpenGraph::default();
    for (property, value) in meta_property_pairs(document) {
        let Some(key) = property.strip_prefix("og:") else { continue };
        match key {
            "title" => og.title = Some(value),
            "description" => og.description = Some(value),
            "image" => og.image = Some(value),
            "url" => og.url = Some(value),
            "type" => og.og_type = Some(value),
            "site_name" => og.site_name = Some(value),
            _ => {}
        }
    }
    og
}

pub fn extract_twitter(document: &Html) -> TwitterCard {
    let mut twitter = TwitterCard::default();
    for (name, value) in meta_name_pairs(document) {
        let Some(key) = name.strip_prefix("twitter:") else { continue };
        match key {
            "card" => twitter.card = Some(value),
            "title" => twitter.title = Some(value),
            "description" => twitter.description = Some(value),
            "image" => twitter.image = Some(value),
            "site" => twitter.site = Some(value),
            _ => {}
        }
    }
    twitter
}

pub fn extract_dublin_core(document: &Html) -> DublinCore {
    let mut dc = DublinCore::default();
    for (name, value) in meta_name_pairs(document) {
        let Some(key) = name.strip_prefix("dc.").or_else(|| name.strip_prefix("dcterms.")) else { continue };
        match key {
            "title" => dc.title = Some(value),
            "creator" => dc.creator = Some(value),
            "subject" => dc.subject = Some(value),
            "description" => dc.description = Some(value),
            "date" => dc.date = Some(value),
            other => {
                dc.extra.insert(other.to_string(), value);
            }
        }
    }
    dc
}

fn meta_name_pairs(document: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("meta[name]") else { return Vec::new() };
    document
        .select(&selector)
        .filter_map(|el| {
            let name = el.value().attr("name")?.to_lowercase();
            let content = el.value().attr("content")?.to_string();
            Some((name, content))
        })
        .collect()
}

fn meta_property_pairs(document: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("meta[property]") else { return Vec::new() };
    document
        .select(&selector)
        .filter_map(|el| {
            let property = el.value().attr("property")?.to_lowercase();
            let content = el.value().attr("content")?.to_string();
            Some((property, content))
        })
        .collect()
}

fn select_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn select_attr(document: &Html, selector_str: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document.select(&selector).next()?.value().attr(attr).map(str::to_string)
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_basic_meta_fields() {
        let html = r#"<html lang="en"><head>
            <title>My Page</title>
            <meta name="description" content="a test page">
            <meta name="keywords" content="rust, web, scraping">
            <link rel="canonical" href="https://example.com/page">
        </head></html>"#;
        let doc = Html::parse_document(html);
        let meta = extract_basic(&doc);
        assert_eq!(meta.title.as_deref(), Some("My Page"));
        assert_eq!(meta.description.as_deref(), Some("a test page"));
        assert_eq!(meta.keywords, Some(vec!["rust".to_string(), "web".to_string(), "scraping".to_string()]));
        assert_eq!(meta.language.as_deref(), Some("en"));
        assert_eq!(meta.canonical_url.as_deref(), Some("https://example.com/page"));
    }

    #[test]
    fn extracts_open_graph_tags() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="https://example.com/img.png">
        </head></html>"#;
        let doc = Html::parse_document(html);
        let og = extract_open_graph(&doc);
        assert_eq!(og.title.as_deref(), Some("OG Title"));
        assert_eq!(og.image.as_deref(), Some("https://example.com/img.png"));
    }

    #[test]
    fn extracts_twitter_and_dublin_core() {
        let html = r#"<html><head>
            <meta name="twitter:card" content="summary_large_image">
            <meta name="DC.creator" content="Ada Lovelace">
        </head></html>"#;
        let doc = Html::parse_document(html);
        let twitter = extract_twitter(&doc);
        let dc = extract_dublin_core(&doc);
        assert_eq!(twitter.card.as_deref(), Some("summary_large_image"));
        assert_eq!(dc.creator.as_deref(), Some("Ada Lovelace"));
    }
}
