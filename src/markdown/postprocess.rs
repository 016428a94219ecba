//! Final cleanup pass: no more than 3 consecutive blank lines, trimmed
//! edges. A single `LazyLock<Regex>` pass over the whole document rather
//! than a line-by-line state machine, since blank-line collapsing needs no
//! fence awareness.

use regex::Regex;
use std::sync::LazyLock;

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{4,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid"));

pub(super) fn finalize(markdown: &str) -> String {
    let collapsed = EXCESS_BLANK_LINES.replace_all(markdown, "\n\n\n");
    collapsed.trim().to_string()
}
