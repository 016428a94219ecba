//! Schema.org extraction from `<script type="application/ld+json">` blocks.
//! JSON-LD is parsed as opaque `serde_json::Value`s rather than mapped into
//! typed structs, since presence/absence is treated as a single dimension
//! rather than the full graph being modeled.

use scraper::{Html, Selector};
use serde_json::Value;

/// Every JSON-LD block on the page, each normalized to a JSON array (a
/// `@graph` object or a single object is wrapped into a one-element list).
pub fn extract_json_ld(document: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else { return Vec::new() };

    document
        .select(&selector)
        .flat_map(|el| {
            let raw: String = el.text().collect();
            parse_ld_block(&raw)
        })
        .collect()
}

fn parse_ld_block(raw: &str) -> Vec<Value> {
    let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else { return Vec::new() };
    match value {
        Value::Array(items) => items,
        Value::Object(ref map) if map.contains_key("@graph") => {
            map.get("@graph").and_then(Value::as_array).cloned().unwrap_or_else(|| vec![value.clone()])
        }
        other => vec![other],
    }
}
