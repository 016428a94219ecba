//! List handlers: `<ul>`/`<ol>` → `-`/ordered lists, nested. The parent
//! list handler walks its direct `<li>` children itself (rather than
//! relying on htmd's automatic dispatch to a registered `li` handler) so it
//! can apply numbering/bullets with knowledge of which list it is.

use htmd::element_handler::{HandlerResult, Handlers};
use htmd::Element;
use markup5ever_rcdom::NodeData;

use super::get_attr;

pub(super) fn unordered_list_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let mut out = String::from("\n");
    for child in direct_children_named(element.node, "li") {
        let content = indent_continuation(handlers.walk_children(child).content.trim());
        if content.is_empty() {
            out.push_str("- \n");
        } else {
            out.push_str(&format!("- {content}\n"));
        }
    }
    out.push('\n');
    Some(HandlerResult::from(out))
}

pub(super) fn ordered_list_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let start: usize = get_attr(element.attrs, "start").and_then(|s| s.parse().ok()).unwrap_or(1);
    let mut out = String::from("\n");
    let mut n = start;
    for child in direct_children_named(element.node, "li") {
        let content = indent_continuation(handlers.walk_children(child).content.trim());
        if content.is_empty() {
            out.push_str(&format!("{n}. \n"));
        } else {
            out.push_str(&format!("{n}. {content}\n"));
        }
        n += 1;
    }
    out.push('\n');
    Some(HandlerResult::from(out))
}

/// A bare `<li>` with no list ancestor (malformed markup) still yields text
/// rather than being silently dropped.
pub(super) fn list_item_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(HandlerResult::from(format!("- {content}\n")))
}

fn direct_children_named(
    node: &std::rc::Rc<markup5ever_rcdom::Node>,
    tag: &str,
) -> Vec<std::rc::Rc<markup5ever_rcdom::Node>> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(&child.data, NodeData::Element { ref name, .. } if &*name.local == tag))
        .cloned()
        .collect()
}

/// Indent every line after the first by two spaces so a nested list's own
/// `-`/`1.` markers line up under the parent item's text rather than its
/// marker column.
fn indent_continuation(content: &str) -> String {
    let mut lines = content.lines();
    let Some(first) = lines.next() else { return String::new() };
    let rest: Vec<String> = lines.map(|l| if l.is_empty() { String::new() } else { format!("  {l}") }).collect();
    if rest.is_empty() {
        first.to_string()
    } else {
        format!("{first}\n{}", rest.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::markdown::{convert, MarkdownConfig};

    #[test]
    fn unordered_list_uses_dash_markers() {
        let html = "<ul><li>one</li><li>two</li></ul>";
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("- one"));
        assert!(md.contains("- two"));
    }

    #[test]
    fn ordered_list_numbers_from_start_attribute() {
        let html = r#"<ol start="3"><li>a</li><li>b</li></ol>"#;
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("3. a"));
        assert!(md.contains("4. b"));
    }

    #[test]
    fn nested_list_is_indented_under_parent_item() {
        let html = "<ul><li>outer<ul><li>inner</li></ul></li></ul>";
        let md = convert(html, &MarkdownConfig::default()).unwrap();
        assert!(md.contains("outer"));
        assert!(md.contains("  - inner"));
    }
}
