//! Content rendering: (content, kind) → HTML fragment.
//!
//! Every kind has its own renderer. Renderers for structured kinds parse
//! first and fall back to the note renderer when parsing fails, so a single
//! malformed item can never break the page it sits on.
//!
//! ## Module Structure
//!
//! - `text` - note, table, and checklist renderers
//! - `diagram` - diagram validation, placeholders, and error fragments
//! - `structured` - JSON-backed link, chart, and form renderers
//! - `preview` - condensed previews and grid cards

mod diagram;
mod preview;
mod structured;
mod text;

use thiserror::Error;
use tracing::debug;

use crate::models::ContentKind;

pub use diagram::{
    is_valid_diagram_syntax, render_diagram_error, DIAGRAM_KEYWORDS, ZOOM_DEFAULT, ZOOM_MAX,
    ZOOM_MIN, ZOOM_STEP,
};
pub use preview::{build_preview, copy_button, format_relative_date, render_card, PREVIEW_MAX_CHARS};
pub use text::render_note;

/// Why a kind-specific renderer gave up. Never leaves this module.
#[derive(Debug, Error)]
enum RenderError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Malformed(&'static str),
}

// ============================================================================
// Renderer
// ============================================================================

/// Renders content fragments. Constructed once per view with the endpoint
/// checklist toggles are posted to.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    toggle_endpoint: Option<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checklists rendered by this renderer post `{checked}` to
    /// `{endpoint}/{content_id}/items/{index}` when a box changes.
    pub fn with_toggle_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            toggle_endpoint: Some(endpoint.into()),
        }
    }

    pub fn toggle_endpoint(&self) -> Option<&str> {
        self.toggle_endpoint.as_deref()
    }

    /// Renders `content` as `kind`. `content_id` ties interactive elements
    /// (checkboxes, chart canvases) back to the stored entity.
    pub fn render(&self, content: &str, kind: ContentKind, content_id: Option<&str>) -> String {
        let rendered = match kind {
            ContentKind::Note => Ok(text::render_note(content)),
            ContentKind::Table => text::render_table(content),
            ContentKind::List => text::render_list(content, content_id, self.toggle_endpoint()),
            ContentKind::Diagram => Ok(diagram::render_diagram(content)),
            ContentKind::Link => structured::render_links(content),
            ContentKind::Chart => structured::render_chart(content, content_id),
            ContentKind::Form => structured::render_form(content),
        };

        rendered.unwrap_or_else(|e| {
            debug!("{} render fell back to note: {}", kind, e);
            text::render_note(content)
        })
    }
}

/// Renders with a renderer that has no checklist endpoint.
pub fn render_content(content: &str, kind: ContentKind, content_id: Option<&str>) -> String {
    Renderer::new().render(content, kind, content_id)
}

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inverse of `html_escape`.
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = r#"<a href="x">Tom & 'Jerry'</a> &amp;"#;
        assert_eq!(html_unescape(&html_escape(raw)), raw);
    }

    #[test]
    fn test_every_kind_survives_garbage() {
        let garbage = ["", "{not json", "|||", "\n\n", "<script>alert(1)</script>", "```"];
        for kind in ContentKind::ALL {
            for input in garbage {
                let html = render_content(input, kind, Some("c1"));
                assert!(!html.contains("<script>alert"), "{} leaked raw markup", kind);
            }
        }
    }

    #[test]
    fn test_malformed_chart_renders_as_note() {
        let html = render_content("{not json", ContentKind::Chart, None);
        assert!(html.contains("class=\"note-content\""));
        assert!(html.contains("{not json"));
        assert!(!html.contains("<canvas"));
    }

    #[test]
    fn test_renderer_threads_toggle_endpoint() {
        let renderer = Renderer::with_toggle_endpoint("/api/contents");
        let html = renderer.render("- [ ] a", ContentKind::List, Some("c9"));
        assert!(html.contains("data-toggle-endpoint=\"/api/contents\""));
        assert!(html.contains("data-content-id=\"c9\""));
    }
}
