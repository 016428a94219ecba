//! Line-level noise removal over Markdown. Reuses the HTML Cleaner's
//! boilerplate vocabulary (nav/footer/ads/social-share/comments), reapplied
//! as substring matches against Markdown lines since the HTML selector pass
//! has already run by the time content reaches the Analyzer. Fence-aware,
//! so code blocks are never treated as boilerplate.

const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    "all rights reserved",
    "copyright ©",
    "subscribe to our newsletter",
    "cookie policy",
    "accept cookies",
    "skip to content",
    "back to top",
    "share this",
    "related posts",
];

const MIN_MEANINGFUL_LINE_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct NoiseConfig {
    pub patterns: Vec<String>,
    pub min_line_len: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_NOISE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            min_line_len: MIN_MEANINGFUL_LINE_LEN,
        }
    }
}

/// Strip lines matching the configured noise vocabulary, skipping fenced
/// code regions entirely.
pub fn strip(markdown: &str, config: &NoiseConfig) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            out.push(line);
            continue;
        }
        if in_fence || !is_noise_line(line, config) {
            out.push(line);
        }
    }

    out.join("\n")
}

/// Density score in [0,1]: fraction of non-empty, non-heading words in
/// `text` that fall inside configured boilerplate phrases.
pub fn density_score(text: &str, config: &NoiseConfig) -> f64 {
    let total_lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if total_lines == 0 {
        return 0.0;
    }
    let noisy_lines = text.lines().filter(|l| is_noise_line(l, config)).count();
    (noisy_lines as f64 / total_lines as f64).clamp(0.0, 1.0)
}

fn is_noise_line(line: &str, config: &NoiseConfig) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.starts_with('#') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if config.patterns.iter().any(|pattern| lower.contains(pattern.as_str())) {
        return true;
    }
    trimmed.chars().filter(|c| c.is_alphanumeric()).count() < config.min_line_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_lines_matching_noise_vocabulary() {
        let md = "# Title\n\nReal content here.\n\nAll Rights Reserved.\n";
        let cleaned = strip(md, &NoiseConfig::default());
        assert!(!cleaned.to_lowercase().contains("all rights reserved"));
        assert!(cleaned.contains("Real content here."));
    }

    #[test]
    fn never_strips_inside_a_code_fence() {
        let md = "```\nAll Rights Reserved.\n```\n";
        let cleaned = strip(md, &NoiseConfig::default());
        assert!(cleaned.to_lowercase().contains("all rights reserved"));
    }

    #[test]
    fn density_score_reflects_fraction_of_noisy_lines() {
        let text = "Good line one.\nGood line two.\nCookie Policy\n";
        let score = density_score(text, &NoiseConfig::default());
        assert!((score - (1.0 / 3.0)).abs() < 1e-9);
    }
}
