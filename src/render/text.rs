//! Plain-text renderers: notes, markdown-style tables, and checklists.

use super::{html_escape, RenderError};
use crate::checklist::parse_items;
use crate::sanitize::strip_fence_markers;

// ============================================================================
// Note
// ============================================================================

pub fn render_note(content: &str) -> String {
    let cleaned = strip_fence_markers(content);
    format!(
        r#"<div class="note-content">{}</div>"#,
        html_escape(&cleaned)
    )
}

// ============================================================================
// Table
// ============================================================================

pub(super) fn render_table(content: &str) -> Result<String, RenderError> {
    let rows: Vec<Vec<String>> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("---"))
        .map(split_row)
        .filter(|cells| !cells.is_empty())
        .collect();

    let (header, body) = rows
        .split_first()
        .ok_or(RenderError::Malformed("table has no rows"))?;

    let mut html = String::from(r#"<table class="content-table"><thead><tr>"#);
    for cell in header {
        html.push_str(&format!("<th>{}</th>", html_escape(cell)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in body {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", html_escape(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    Ok(html)
}

/// Splits a `| a | b |` row. Outer pipes are optional; inner empty cells stay.
fn split_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();
    if cells.iter().all(|c| c.is_empty()) {
        Vec::new()
    } else {
        cells
    }
}

// ============================================================================
// Checklist
// ============================================================================

pub(super) fn render_list(
    content: &str,
    content_id: Option<&str>,
    toggle_endpoint: Option<&str>,
) -> Result<String, RenderError> {
    let items = parse_items(content);
    if items.is_empty() {
        return Err(RenderError::Malformed("checklist has no items"));
    }

    // Without an owning entity there is nothing to write back to.
    let interactive = content_id.is_some() && toggle_endpoint.is_some();

    let mut html = match toggle_endpoint {
        Some(endpoint) if interactive => format!(
            r#"<ul class="todo-list" data-toggle-endpoint="{}">"#,
            html_escape(endpoint)
        ),
        _ => String::from(r#"<ul class="todo-list">"#),
    };

    for item in items {
        html.push_str(&format!(
            r#"<li class="todo-item"><input type="checkbox"{checked}{disabled} data-content-id="{id}" data-item-index="{index}"><span>{label}</span></li>"#,
            checked = if item.checked { " checked" } else { "" },
            disabled = if interactive { "" } else { " disabled" },
            id = html_escape(content_id.unwrap_or("")),
            index = item.line_index,
            label = html_escape(&item.label),
        ));
    }

    html.push_str("</ul>");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_escapes_and_strips_fences() {
        let html = render_note("```text\n<b>bold</b> & more\n```");
        assert_eq!(
            html,
            "<div class=\"note-content\">&lt;b&gt;bold&lt;/b&gt; &amp; more\n</div>"
        );
    }

    #[test]
    fn test_table_header_and_body() {
        let html = render_table("a|b\n---|---\n1|2").unwrap();
        assert_eq!(
            html,
            "<table class=\"content-table\"><thead><tr><th>a</th><th>b</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_table_with_outer_pipes() {
        let html = render_table("| Name | Age |\n|------|-----|\n| Ann | 31 |\n| Bo |  |").unwrap();
        assert!(html.contains("<th>Name</th><th>Age</th>"));
        assert!(html.contains("<td>Ann</td><td>31</td>"));
        assert!(html.contains("<td>Bo</td><td></td>"));
        assert!(!html.contains("---"));
    }

    #[test]
    fn test_table_without_rows_is_malformed() {
        assert!(render_table("---|---\n\n").is_err());
        assert!(render_table("| |").is_err());
    }

    #[test]
    fn test_list_items_carry_index_and_state() {
        let html = render_list("- [ ] milk\n\n- [x] eggs", Some("abc"), Some("/api/contents")).unwrap();
        assert!(html.contains(r#"<input type="checkbox" data-content-id="abc" data-item-index="0"><span>milk</span>"#));
        assert!(html.contains(r#"<input type="checkbox" checked data-content-id="abc" data-item-index="2"><span>eggs</span>"#));
    }

    #[test]
    fn test_list_without_owner_is_disabled() {
        let html = render_list("- [ ] milk", None, Some("/api/contents")).unwrap();
        assert!(html.contains(" disabled"));
        assert!(!html.contains("data-toggle-endpoint"));
    }

    #[test]
    fn test_empty_list_is_malformed() {
        assert!(render_list("\n  \n", Some("x"), None).is_err());
    }
}
