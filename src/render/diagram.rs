//! Diagram placeholders.
//!
//! The renderer only validates and emits a placeholder; turning the source
//! into SVG is the hydrator's job.

use uuid::Uuid;

use super::html_escape;
use crate::sanitize::clean_diagram;

/// Grammar keywords accepted on the first line of a diagram.
pub const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
];

pub const ZOOM_DEFAULT: f64 = 1.0;
pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.2;

/// Case-insensitive keyword match against the first line only.
pub fn is_valid_diagram_syntax(code: &str) -> bool {
    let first_line = code.trim().lines().next().unwrap_or("").to_lowercase();
    DIAGRAM_KEYWORDS
        .iter()
        .any(|keyword| first_line.contains(&keyword.to_lowercase()))
}

pub(super) fn render_diagram(content: &str) -> String {
    let code = clean_diagram(content);
    if !is_valid_diagram_syntax(&code) {
        return render_diagram_error(content.trim());
    }

    let element_id = format!("mermaid-{}", Uuid::new_v4().simple());

    format!(
        r#"<div class="mermaid-container" data-zoom="{default}" data-zoom-min="{min}" data-zoom-max="{max}" data-zoom-step="{step}">
    <div class="mermaid-controls">
        <button type="button" class="mermaid-control-btn zoom-in" title="Zoom in">+</button>
        <button type="button" class="mermaid-control-btn zoom-out" title="Zoom out">&minus;</button>
        <button type="button" class="mermaid-control-btn zoom-reset" title="Reset zoom">&#8634;</button>
    </div>
    <div class="mermaid-diagram-wrapper"><div class="mermaid-diagram" id="{id}">{code}</div></div>
</div>"#,
        default = ZOOM_DEFAULT,
        min = ZOOM_MIN,
        max = ZOOM_MAX,
        step = ZOOM_STEP,
        id = element_id,
        code = html_escape(&code),
    )
}

/// Inline error shown in place of a diagram, keeping the source visible.
pub fn render_diagram_error(source: &str) -> String {
    format!(
        r#"<div class="diagram-error"><p>⚠️ Diagram could not be rendered</p><pre>{}</pre></div>"#,
        html_escape(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_known_keywords() {
        assert!(is_valid_diagram_syntax("graph LR\nA-->B"));
        assert!(is_valid_diagram_syntax("  SEQUENCEDIAGRAM\n"));
        assert!(is_valid_diagram_syntax("pie title Pets"));
    }

    #[test]
    fn test_keyword_must_be_on_first_line() {
        assert!(!is_valid_diagram_syntax("hello world"));
        assert!(!is_valid_diagram_syntax("Some intro\ngraph LR"));
        assert!(!is_valid_diagram_syntax(""));
    }

    #[test]
    fn test_valid_diagram_emits_placeholder() {
        let html = render_diagram("graph LR\nA-->B");
        assert!(html.contains("class=\"mermaid-diagram\" id=\"mermaid-"));
        assert!(html.contains("graph LR\nA--&gt;B"));
        assert!(html.contains("data-zoom=\"1\""));
        assert!(html.contains("data-zoom-min=\"0.5\""));
        assert!(html.contains("data-zoom-max=\"3\""));
        assert!(html.contains("data-zoom-step=\"0.2\""));
        assert!(html.contains("zoom-in") && html.contains("zoom-out") && html.contains("zoom-reset"));
    }

    #[test]
    fn test_placeholder_ids_are_unique() {
        let a = render_diagram("graph LR\nA-->B");
        let b = render_diagram("graph LR\nA-->B");
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_diagram_shows_error_with_text() {
        let html = render_diagram("hello world");
        assert!(html.contains("diagram-error"));
        assert!(html.contains("<pre>hello world</pre>"));
        assert!(!html.contains("mermaid-diagram"));
    }
}
