//! Cleanup of raw model output before it is classified, stored, or rendered.
//!
//! Language models like to wrap answers in fenced code blocks and the diagram
//! grammar only accepts ASCII, so both have to be undone before anything else
//! looks at the text. Every function here is total: bad input comes back
//! trimmed, never as an error.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::ContentKind;

/// Fence label used by diagram blocks.
pub const DIAGRAM_FENCE: &str = "mermaid";

/// Fence label used by JSON blocks.
pub const JSON_FENCE: &str = "json";

static GENERIC_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    // Optional one-word info string on the opening line, then the body.
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+.-]*[ \t]*\r?\n)?(.*?)```").expect("valid regex")
});

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[^\n]*\n").expect("valid regex"));

/// Accented letters the diagram grammar chokes on, with their replacements.
/// Lowercase and uppercase forms both map to the lowercase ASCII letter,
/// except dotted capital I which keeps its case.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ü', "u"),
    ('Ü', "u"),
    ('ö', "o"),
    ('Ö', "o"),
    ('ş', "s"),
    ('Ş', "s"),
    ('ı', "i"),
    ('ğ', "g"),
    ('Ğ', "g"),
    ('ç', "c"),
    ('Ç', "c"),
    ('İ', "I"),
];

// ============================================================================
// Fence Extraction
// ============================================================================

/// Returns the interior of the first fenced block, preferring one labelled
/// `label`. Falls back to the trimmed input when there is no complete fence.
pub fn extract_fenced(raw: &str, label: &str) -> String {
    let text = raw.trim();

    let labelled = format!("```{}", label);
    if let Some(start) = text.find(&labelled) {
        let body_start = start + labelled.len();
        if let Some(end) = text[body_start..].find("```") {
            return text[body_start..body_start + end].trim().to_string();
        }
    } else if let Some(caps) = GENERIC_FENCE.captures(text) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim().to_string();
        }
    }

    strip_unterminated_fence(text)
}

/// An opening fence that is never closed: drop the opening line, keep the rest.
fn strip_unterminated_fence(text: &str) -> String {
    if text.starts_with("```") {
        match text.split_once('\n') {
            Some((_, rest)) => rest.trim().to_string(),
            None => text.trim_start_matches('`').trim().to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Removes fence marker lines and any leftover backtick triples.
pub fn strip_fence_markers(text: &str) -> String {
    FENCE_LINE.replace_all(text, "").replace("```", "")
}

// ============================================================================
// Kind-specific Cleanup
// ============================================================================

/// Maps the locale-specific letters in `TRANSLITERATIONS` to ASCII.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match TRANSLITERATIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

pub fn clean_diagram(raw: &str) -> String {
    transliterate(&extract_fenced(raw, DIAGRAM_FENCE)).trim().to_string()
}

pub fn clean_json(raw: &str) -> String {
    extract_fenced(raw, JSON_FENCE)
}

/// Cleans generated text for storage as `kind`.
pub fn sanitize_for_kind(raw: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Diagram => clean_diagram(raw),
        ContentKind::Link | ContentKind::Chart | ContentKind::Form => clean_json(raw),
        ContentKind::Note | ContentKind::Table | ContentKind::List => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_labelled_diagram_fence() {
        let raw = "Here you go:\n```text\nignored\n```\n```mermaid\ngraph TD\nA-->B\n```";
        assert_eq!(extract_fenced(raw, "mermaid"), "graph TD\nA-->B");
    }

    #[test]
    fn test_generic_fence_drops_info_string() {
        let raw = "```json\n{\"links\": []}\n```";
        assert_eq!(extract_fenced(raw, "mermaid"), "{\"links\": []}");
        assert_eq!(extract_fenced("```\ngraph LR\n```", "mermaid"), "graph LR");
    }

    #[test]
    fn test_unfenced_text_is_trimmed() {
        assert_eq!(extract_fenced("  graph LR\nA-->B \n", "mermaid"), "graph LR\nA-->B");
        assert_eq!(extract_fenced("", "mermaid"), "");
    }

    #[test]
    fn test_unterminated_fence_drops_opening_line() {
        assert_eq!(extract_fenced("```mermaid\ngraph LR\nA-->B", "mermaid"), "graph LR\nA-->B");
    }

    #[test]
    fn test_transliterates_case_insensitively() {
        assert_eq!(transliterate("Üzüm Şeker ığdır Çay Göl İstanbul"), "uzum seker igdir cay Gol Istanbul");
        assert_eq!(transliterate("plain ascii"), "plain ascii");
    }

    #[test]
    fn test_clean_diagram_combines_fence_and_transliteration() {
        let raw = "```mermaid\ngraph LR\n  A[Başla] --> B[Bitiş]\n```";
        assert_eq!(clean_diagram(raw), "graph LR\n  A[Basla] --> B[Bitis]");
    }

    #[test]
    fn test_strip_fence_markers() {
        assert_eq!(strip_fence_markers("```md\nhello\n```"), "hello\n");
    }

    #[test]
    fn test_sanitize_for_kind_leaves_text_kinds_alone() {
        assert_eq!(sanitize_for_kind("  | a | b |  ", ContentKind::Table), "| a | b |");
        assert_eq!(
            sanitize_for_kind("```json\n{\"fields\": []}\n```", ContentKind::Form),
            "{\"fields\": []}"
        );
    }
}
