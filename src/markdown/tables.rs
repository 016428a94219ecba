//! Table handler: `<table>` → GitHub-flavored Markdown table, emitting a
//! header separator row. Walks and collects `<tr>`/`<td>`/`<th>` the same
//! way the list handlers walk `<li>`.

use htmd::element_handler::{HandlerResult, Handlers};
use htmd::Element;
use markup5ever_rcdom::{Node, NodeData};
use std::rc::Rc;

use super::extract_text;

pub(super) fn table_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let rows = collect_rows(element.node);
    if rows.is_empty() {
        return None;
    }

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in &rows {
        grid.push(collect_cells(row));
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return None;
    }
    for row in &mut grid {
        while row.len() < columns {
            row.push(String::new());
        }
    }

    let mut out = String::from("\n\n");
    out.push_str(&render_row(&grid[0]));
    out.push('\n');
    out.push_str(&render_separator(columns));
    out.push('\n');
    for row in &grid[1..] {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push('\n');

    Some(HandlerResult::from(out))
}

fn render_row(cells: &[String]) -> String {
    let joined = cells.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join(" | ");
    format!("| {joined} |")
}

fn render_separator(columns: usize) -> String {
    let cells = vec!["---"; columns].join(" | ");
    format!("| {cells} |")
}

fn escape_cell(text: &str) -> String {
    text.trim().replace('|', "\\|").replace('\n', " ")
}

fn collect_rows(node: &Rc<Node>) -> Vec<Rc<Node>> {
    let mut rows = Vec::new();
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Element { ref name, .. } if &*name.local == "tr" => rows.push(child.clone()),
            NodeData::Element { ref name, .. } if matches!(&*name.local, "thead" | "tbody" | "tfoot") => {
                rows.extend(collect_rows(child));
            }
            _ => {}
        }
    }
    rows
}

fn collect_cells(row: &Rc<Node>) -> Vec<String> {
    row.children
        .borrow()
        .iter()
        .filter(|child| matches!(&child.data, NodeData::Element { ref name, .. } if matches!(&*name.local, "td" | "th")))
        .map(|cell| extract_text(cell).trim().to_string())
        .collect()
}
