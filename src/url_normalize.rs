//! URL canonicalization.
//!
//! Pure functions: `normalize` never fails — invalid input is returned
//! unchanged so the caller can treat it as an opaque, unequivocally distinct
//! value, following a parse-then-fallback shape.

use url::Url;

/// Normalize a URL into its canonical form.
///
/// Rules: lowercase host, strip a leading `www.`, drop default
/// ports, drop the fragment, collapse repeated slashes in the path, and
/// remove a trailing slash except for the root path.
#[must_use]
pub fn normalize(input: &str) -> String {
    let Ok(mut url) = Url::parse(input) else {
        return input.to_string();
    };

    // Lowercase host.
    if let Some(host) = url.host_str() {
        let lower = host.to_lowercase();
        if lower != host {
            let _ = url.set_host(Some(&lower));
        }
    }

    // Strip leading "www.".
    if let Some(host) = url.host_str() {
        if let Some(stripped) = host.strip_prefix("www.") {
            let stripped = stripped.to_string();
            let _ = url.set_host(Some(&stripped));
        }
    }

    // Drop default ports.
    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        let _ = url.set_port(None);
    }

    // Drop fragment.
    url.set_fragment(None);

    // Collapse "//" in the path and strip a trailing slash (unless root).
    let collapsed = collapse_slashes(url.path());
    let trimmed = if collapsed.len() > 1 {
        collapsed.trim_end_matches('/')
    } else {
        collapsed.as_str()
    };
    let final_path = if trimmed.is_empty() { "/" } else { trimmed };
    url.set_path(final_path);

    url.to_string()
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(ch);
    }
    out
}

/// Equivalence = canonical equality.
#[must_use]
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
