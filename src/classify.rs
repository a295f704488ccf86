//! Content type classification.
//!
//! Resolves a request-time hint into a concrete `ContentKind`. An explicit
//! hint always wins; `auto` runs an ordered list of structural heuristics and
//! the first one that matches decides the kind.

use serde_json::{Map, Value};

use crate::models::{ContentHint, ContentKind};
use crate::sanitize::clean_json;

/// Substrings that mark text as diagram source.
const DIAGRAM_MARKERS: &[&str] = &["```mermaid", "graph ", "flowchart ", "sequenceDiagram"];

/// Substrings that mark text as a checklist.
const CHECKLIST_MARKERS: &[&str] = &["- [ ]", "- [x]", "- [X]"];

pub fn classify(content: &str, hint: ContentHint) -> ContentKind {
    match hint {
        ContentHint::Kind(kind) => kind,
        ContentHint::Auto => detect_kind(content),
    }
}

/// Runs the `auto` heuristics. Never fails; unmatched text is a note.
pub fn detect_kind(content: &str) -> ContentKind {
    let text = content.trim();

    if let Some(shape) = JsonShape::sniff(text) {
        if shape.has("links") {
            return ContentKind::Link;
        }
        if shape.has("type") && shape.has("datasets") {
            return ContentKind::Chart;
        }
        if shape.has("fields") {
            return ContentKind::Form;
        }
    }

    if DIAGRAM_MARKERS.iter().any(|m| text.contains(m)) {
        return ContentKind::Diagram;
    }

    if text.contains('|') && text.contains("---") {
        return ContentKind::Table;
    }

    if CHECKLIST_MARKERS.iter().any(|m| text.contains(m)) {
        return ContentKind::List;
    }

    ContentKind::Note
}

// ============================================================================
// JSON Shape Sniffing
// ============================================================================

/// Top-level keys of something that looks like a JSON object.
///
/// Well-formed objects report their real keys. Text that starts with `{` but
/// does not parse still reports a key when its quoted name appears anywhere,
/// so slightly broken model output keeps its intended kind.
enum JsonShape {
    Parsed(Map<String, Value>),
    Loose(String),
}

impl JsonShape {
    fn sniff(text: &str) -> Option<Self> {
        let body = clean_json(text);
        if !body.starts_with('{') {
            return None;
        }
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Some(JsonShape::Parsed(map)),
            Ok(_) => None,
            Err(_) => Some(JsonShape::Loose(body)),
        }
    }

    fn has(&self, key: &str) -> bool {
        match self {
            JsonShape::Parsed(map) => map.contains_key(key),
            JsonShape::Loose(body) => body.contains(&format!("\"{}\"", key)),
        }
    }
}
