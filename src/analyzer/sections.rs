//! Hierarchical section tree construction. Depth is naturally capped at 6
//! since ATX headings top out at `######`; anything deeper in the source
//! structure flattens onto a level-6 section.

use super::noise::{self, NoiseConfig};
use crate::model::Section;

const MAX_DEPTH: u8 = 6;

#[derive(Debug, Clone)]
struct FlatSection {
    level: u8,
    heading: String,
    body: String,
}

/// Parse ATX headings out of `markdown` into a flat, heading-ordered list,
/// each carrying the body text up to (not including) the next heading.
fn flatten(markdown: &str) -> Vec<FlatSection> {
    let mut sections = Vec::new();
    let mut current: Option<FlatSection> = None;
    let mut in_fence = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            if let Some(section) = current.as_mut() {
                section.body.push_str(line);
                section.body.push('\n');
            }
            continue;
        }

        if !in_fence && let Some(level) = heading_level(trimmed) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            let heading_text = trimmed.trim_start_matches('#').trim().to_string();
            current = Some(FlatSection { level: level.min(MAX_DEPTH), heading: heading_text, body: String::new() });
            continue;
        }

        match current.as_mut() {
            Some(section) => {
                section.body.push_str(line);
                section.body.push('\n');
            }
            None => {
                // Preamble text before the first heading becomes an
                // implicit level-0 root section.
                current = Some(FlatSection { level: 0, heading: String::new(), body: format!("{line}\n") });
            }
        }
    }
    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

fn heading_level(line: &str) -> Option<u8> {
    if !line.starts_with('#') {
        return None;
    }
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes > 6 || line.chars().nth(hashes).is_none_or(|c| c != ' ') {
        return None;
    }
    Some(hashes as u8)
}

/// Nest a flat, level-ordered section list into a tree by level.
fn nest(flat: Vec<FlatSection>) -> Vec<Section> {
    let mut roots: Vec<Section> = Vec::new();
    let mut stack: Vec<(u8, usize)> = Vec::new(); // (level, index path unused; we track via mutable refs below)

    for item in flat {
        let text = if item.heading.is_empty() {
            item.body.trim().to_string()
        } else {
            format!("{}\n\n{}", item.heading, item.body.trim())
        };
        let section = Section { heading_level: item.level, text, children: Vec::new(), noise_score: 0.0 };

        if item.level == 0 || stack.is_empty() {
            roots.push(section);
            stack.clear();
            stack.push((item.level, roots.len() - 1));
            continue;
        }

        while let Some(&(top_level, _)) = stack.last() {
            if top_level >= item.level && stack.len() > 1 {
                stack.pop();
            } else {
                break;
            }
        }

        if let Some(&(top_level, _)) = stack.last() {
            if top_level < item.level {
                if let Some(parent) = resolve_path(&mut roots, &stack) {
                    parent.children.push(section);
                    let child_idx = parent.children.len() - 1;
                    stack.push((item.level, child_idx));
                    continue;
                }
            }
        }

        roots.push(section);
        stack.clear();
        stack.push((item.level, roots.len() - 1));
    }

    roots
}

fn resolve_path<'a>(roots: &'a mut [Section], stack: &[(u8, usize)]) -> Option<&'a mut Section> {
    let mut iter = stack.iter();
    let &(_, first_idx) = iter.next()?;
    let mut current = roots.get_mut(first_idx)?;
    for &(_, idx) in iter {
        current = current.children.get_mut(idx)?;
    }
    Some(current)
}

/// Merge sections (and their subtrees) shorter than `min_section_length`
/// characters into the preceding sibling, recursively, bottom-up.
pub fn merge_short_sections(sections: Vec<Section>, min_section_length: usize) -> Vec<Section> {
    let mut merged: Vec<Section> = Vec::new();
    for mut section in sections {
        section.children = merge_short_sections(section.children, min_section_length);

        if section.text.len() < min_section_length {
            if let Some(prev) = merged.last_mut() {
                if !section.text.is_empty() {
                    prev.text.push_str("\n\n");
                    prev.text.push_str(&section.text);
                }
                prev.children.extend(section.children);
                continue;
            }
        }
        merged.push(section);
    }
    merged
}

/// Build the merged, noise-scored section tree from `markdown`.
pub fn build(markdown: &str, min_section_length: usize, noise_config: &NoiseConfig) -> Vec<Section> {
    let flat = flatten(markdown);
    let tree = nest(flat);
    let merged = merge_short_sections(tree, min_section_length);
    score_noise(merged, noise_config)
}

fn score_noise(sections: Vec<Section>, config: &NoiseConfig) -> Vec<Section> {
    sections
        .into_iter()
        .map(|mut section| {
            section.noise_score = noise::density_score(&section.text, config);
            section.children = score_noise(section.children, config);
            section
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree_from_heading_levels() {
        let md = "# Top\n\nintro\n\n## Child\n\nchild text\n\n### Grandchild\n\ndeep text\n";
        let tree = build(md, 0, &NoiseConfig::default());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].heading_level, 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 1);
    }

    #[test]
    fn short_sections_merge_into_predecessor() {
        let md = "# A\n\nlong enough content that is not short at all\n\n# B\n\nhi\n";
        let tree = build(md, 20, &NoiseConfig::default());
        assert_eq!(tree.len(), 1);
        assert!(tree[0].text.contains('B'));
    }

    #[test]
    fn heading_depth_never_exceeds_six() {
        let md = "####### too deep\n\ntext\n";
        let tree = build(md, 0, &NoiseConfig::default());
        // A 7th '#' is not a valid ATX heading at all, so it falls back to
        // plain preamble text rather than a level-7 section.
        assert!(tree.iter().all(|s| s.heading_level <= 6));
    }
}
