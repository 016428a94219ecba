//! Default selector lists: a small, common set of content and boilerplate
//! selectors rather than an exhaustive framework-specific noise list.

pub fn default_content_selectors() -> Vec<String> {
    ["article", "main", "[role=main]", ".content"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn default_always_removed() -> Vec<String> {
    [
        "nav",
        "header",
        "footer",
        "aside",
        ".sidebar",
        ".ads",
        ".advertisement",
        ".social-share",
        ".comments",
        ".related-posts",
        "[aria-hidden=true]",
        "[role=navigation]",
        "[role=complementary]",
        "script",
        "style",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
