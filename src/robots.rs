//! `robots.txt` parsing and fetch-permission evaluation.
//!
//! The parser is tolerant (comments, blank lines, unknown directives are
//! preserved rather than rejected). The caching layer is a TTL'd per-host
//! map in front of a pure parse/check pair.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// One `Allow`/`Disallow` entry under a user-agent block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    pub rule_type: RuleType,
    pub pattern: String,
    pub user_agent: String,
    /// Specificity used for rule selection: the character length of
    /// `pattern` (spec: "longest-matching pattern wins").
    pub priority: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Allow,
    Disallow,
}

/// Parsed `robots.txt` document.
#[derive(Debug, Clone, Default)]
pub struct RobotsMetadata {
    pub base_url: String,
    /// Keyed by lowercased user-agent token, including `"*"`.
    pub rules: HashMap<String, Vec<RobotsRule>>,
    pub crawl_delay: HashMap<String, Duration>,
    pub sitemaps: Vec<String>,
    pub preferred_host: Option<String>,
    /// Unknown directives (`Request-rate`, `Visit-time`, ...), verbatim.
    pub additional_metadata: HashMap<String, Vec<String>>,
}

impl RobotsMetadata {
    /// Evaluate whether `user_agent` may fetch `url`.
    #[must_use]
    pub fn allowed(&self, url: &str, user_agent: &str) -> bool {
        let path = request_path(url);
        let agent_key = self.select_agent_block(user_agent);
        let Some(agent_key) = agent_key else {
            return true;
        };
        let Some(rules) = self.rules.get(&agent_key) else {
            return true;
        };

        let mut best: Option<&RobotsRule> = None;
        for rule in rules {
            if !pattern_matches(&rule.pattern, &path) {
                continue;
            }
            best = Some(match best {
                None => rule,
                Some(current) => {
                    if rule.priority > current.priority {
                        rule
                    } else if rule.priority == current.priority
                        && rule.rule_type == RuleType::Allow
                        && current.rule_type == RuleType::Disallow
                    {
                        // Tie: Allow beats Disallow.
                        rule
                    } else {
                        current
                    }
                }
            });
        }

        match best {
            None => true,
            Some(rule) => rule.rule_type == RuleType::Allow,
        }
    }

    /// Crawl delay for `user_agent`, falling back to the `*` block.
    #[must_use]
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        let lower = user_agent.to_lowercase();
        self.crawl_delay
            .get(&lower)
            .or_else(|| self.crawl_delay.get("*"))
            .copied()
    }

    fn select_agent_block(&self, user_agent: &str) -> Option<String> {
        let lower = user_agent.to_lowercase();
        if self.rules.contains_key(&lower) {
            Some(lower)
        } else if self.rules.contains_key("*") {
            Some("*".to_string())
        } else {
            None
        }
    }
}

fn request_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            path
        }
        Err(_) => url.to_string(),
    }
}

/// Glob match with `*` (any sequence) and a trailing `$` (end anchor),
/// otherwise prefix match, per the standard `robots.txt` convention.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        // An empty Disallow/Allow value is a no-op, never a match.
        return false;
    }
    let regex_src = compile_pattern(pattern);
    regex::Regex::new(&regex_src)
        .map(|re| re.is_match(path))
        .unwrap_or(false)
}

fn compile_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 1);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '$' => out.push('$'),
            c if regex_special(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn regex_special(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '|' | '\\'
    )
}

/// Parse `robots.txt` content into structured metadata.
#[must_use]
pub fn parse(content: &str, base_url: &str) -> RobotsMetadata {
    let mut meta = RobotsMetadata {
        base_url: base_url.to_string(),
        ..Default::default()
    };

    let mut current_agents: Vec<String> = Vec::new();
    let mut group_started = false;

    for raw_line in content.lines() {
        let line = match raw_line.find('#') {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let field = field.trim().to_lowercase();
        let value = value.trim();

        match field.as_str() {
            "user-agent" => {
                if group_started {
                    current_agents.clear();
                    group_started = false;
                }
                let agent = value.to_lowercase();
                meta.rules.entry(agent.clone()).or_default();
                current_agents.push(agent);
            }
            "allow" | "disallow" => {
                group_started = true;
                if current_agents.is_empty() {
                    continue;
                }
                let rule_type = if field == "allow" {
                    RuleType::Allow
                } else {
                    RuleType::Disallow
                };
                if value.is_empty() {
                    // No-op per convention: an empty pattern blocks nothing.
                    continue;
                }
                for agent in &current_agents {
                    meta.rules.entry(agent.clone()).or_default().push(RobotsRule {
                        rule_type,
                        pattern: value.to_string(),
                        user_agent: agent.clone(),
                        priority: value.chars().count(),
                    });
                }
            }
            "crawl-delay" => {
                group_started = true;
                if let Ok(secs) = value.parse::<f64>() {
                    let dur = Duration::from_secs_f64(secs.max(0.0));
                    for agent in &current_agents {
                        meta.crawl_delay.insert(agent.clone(), dur);
                    }
                }
            }
            "sitemap" => meta.sitemaps.push(value.to_string()),
            "host" => meta.preferred_host = Some(value.to_string()),
            other => {
                meta.additional_metadata
                    .entry(other.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }
    }

    meta
}

struct CachedRobots {
    metadata: RobotsMetadata,
    fetched_at: Instant,
}

/// TTL'd per-host cache fronting `parse`/`allowed`.
pub struct RobotsCache {
    cache: Mutex<HashMap<String, CachedRobots>>,
    ttl: Duration,
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl RobotsCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert or refresh the cached metadata for `host`.
    pub fn put(&self, host: &str, metadata: RobotsMetadata) {
        self.cache.lock().insert(
            host.to_string(),
            CachedRobots {
                metadata,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Whether `host` has a fresh (non-expired) cache entry.
    #[must_use]
    pub fn is_fresh(&self, host: &str) -> bool {
        self.cache
            .lock()
            .get(host)
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.ttl)
    }

    /// Evaluate permission using the cached entry for `host`, if fresh.
    #[must_use]
    pub fn allowed(&self, host: &str, url: &str, user_agent: &str) -> Option<bool> {
        let cache = self.cache.lock();
        let entry = cache.get(host)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.metadata.allowed(url, user_agent))
    }

    #[must_use]
    pub fn crawl_delay(&self, host: &str) -> Option<Duration> {
        let cache = self.cache.lock();
        cache.get(host).and_then(|e| e.metadata.crawl_delay("*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_robots_scenario() {
        let content = "User-agent: *\nAllow: /docs\nDisallow: /";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/docs/x", "any-bot"));
        assert!(!meta.allowed("https://s/x", "any-bot"));
    }

    #[test]
    fn longest_match_wins() {
        let content = "User-agent: *\nAllow: /a/b\nDisallow: /a";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/a/b", "bot"));
        assert!(!meta.allowed("https://s/a/c", "bot"));
    }

    #[test]
    fn tie_allow_beats_disallow() {
        // Two rules with equal-length patterns pointing at the same path.
        let content = "User-agent: *\nDisallow: /x\nAllow: /x";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/x", "bot"));
    }

    #[test]
    fn exact_agent_preferred_over_wildcard() {
        let content = "User-agent: GoodBot\nAllow: /\nUser-agent: *\nDisallow: /";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/anything", "GoodBot"));
        assert!(!meta.allowed("https://s/anything", "OtherBot"));
    }

    #[test]
    fn crawl_delay_falls_back_to_wildcard() {
        let content = "User-agent: *\nCrawl-delay: 5\n";
        let meta = parse(content, "https://s");
        assert_eq!(meta.crawl_delay("anybot"), Some(Duration::from_secs(5)));
    }

    #[test]
    fn comments_and_unknown_directives_tolerated() {
        let content = "# comment\nUser-agent: *\nRequest-rate: 1/10\nDisallow: /priv\n\n";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/pub", "bot"));
        assert!(!meta.allowed("https://s/priv/x", "bot"));
        assert_eq!(
            meta.additional_metadata.get("request-rate"),
            Some(&vec!["1/10".to_string()])
        );
    }

    #[test]
    fn empty_disallow_allows_all() {
        let content = "User-agent: *\nDisallow:\n";
        let meta = parse(content, "https://s");
        assert!(meta.allowed("https://s/anything", "bot"));
    }

    #[test]
    fn dollar_anchors_end_of_pattern() {
        let content = "User-agent: *\nDisallow: /forest*.py$\n";
        let meta = parse(content, "https://s");
        assert!(!meta.allowed("https://s/forest/tree/snake.py", "bot"));
        assert!(meta.allowed("https://s/forest/tree/snake.py.bak", "bot"));
    }

    #[test]
    fn sitemap_collected_regardless_of_group() {
        let content = "User-agent: *\nDisallow: /\nSitemap: https://s/sitemap.xml";
        let meta = parse(content, "https://s");
        assert_eq!(meta.sitemaps, vec!["https://s/sitemap.xml".to_string()]);
    }

    #[test]
    fn cache_respects_ttl() {
        let cache = RobotsCache::new(Duration::from_millis(20));
        cache.put("example.com", parse("User-agent: *\nDisallow: /x", "https://example.com"));
        assert!(cache.is_fresh("example.com"));
        assert_eq!(cache.allowed("example.com", "https://example.com/x", "bot"), Some(false));
        std::thread::sleep(Duration::from_millis(30));
        assert!(!cache.is_fresh("example.com"));
        assert_eq!(cache.allowed("example.com", "https://example.com/x", "bot"), None);
    }
}
