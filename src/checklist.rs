//! Checklist parsing and single-item marker rewriting.
//!
//! Item indices are line indices into the stored content (split on `\n`), so a
//! toggle coming back from the page always lands on the line that produced
//! the checkbox, blank lines included.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Optional bullet, then a `[ ]`, `[x]` or `[X]` marker.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>\s*)(?P<bullet>[-*+]\s*)?\[(?P<state>[ xX])\]\s*").expect("valid regex")
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<indent>\s*)(?P<bullet>[-*+]\s+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub line_index: usize,
    pub checked: bool,
    pub label: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("item {index} is out of range ({lines} lines)")]
    IndexOutOfRange { index: usize, lines: usize },

    #[error("line {0} is blank")]
    BlankLine(usize),
}

/// One item per non-blank line. Lines without a marker are unchecked items.
pub fn parse_items(content: &str) -> Vec<ChecklistItem> {
    content
        .split('\n')
        .enumerate()
        .filter_map(|(line_index, line)| {
            if line.trim().is_empty() {
                return None;
            }
            let (checked, label) = match MARKER.captures(line) {
                Some(caps) => {
                    let checked = caps
                        .name("state")
                        .map(|s| s.as_str().eq_ignore_ascii_case("x"))
                        .unwrap_or(false);
                    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    (checked, line[end..].trim().to_string())
                }
                None => {
                    let end = BULLET.find(line).map(|m| m.end()).unwrap_or(0);
                    (false, line[end..].trim().to_string())
                }
            };
            if label.is_empty() {
                return None;
            }
            Some(ChecklistItem {
                line_index,
                checked,
                label,
            })
        })
        .collect()
}

/// Rewrites the marker on `line_index` to match `checked`, leaving every other
/// line byte-for-byte intact. A line without a marker gains one.
pub fn set_item_checked(
    content: &str,
    line_index: usize,
    checked: bool,
) -> Result<String, ChecklistError> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let line_count = lines.len();
    let line = lines
        .get_mut(line_index)
        .ok_or(ChecklistError::IndexOutOfRange {
            index: line_index,
            lines: line_count,
        })?;

    if line.trim().is_empty() {
        return Err(ChecklistError::BlankLine(line_index));
    }

    let mark = if checked { "[x]" } else { "[ ]" };
    let rewritten = match MARKER.captures(line) {
        Some(caps) => {
            let state = caps.name("state").map(|m| m.start() - 1);
            match state {
                Some(open) => format!("{}{}{}", &line[..open], mark, &line[open + 3..]),
                None => line.clone(),
            }
        }
        None => match BULLET.captures(line) {
            Some(caps) => {
                let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                format!("{}{} {}", &line[..end], mark, &line[end..])
            }
            None => {
                let indent_len = line.len() - line.trim_start().len();
                format!("{}- {} {}", &line[..indent_len], mark, &line[indent_len..])
            }
        },
    };
    *line = rewritten;

    Ok(lines.join("\n"))
}

/// Flips the checked state of the item on `line_index`.
pub fn toggle_item(content: &str, line_index: usize) -> Result<String, ChecklistError> {
    let currently = parse_items(content)
        .into_iter()
        .find(|item| item.line_index == line_index)
        .map(|item| item.checked)
        .unwrap_or(false);
    set_item_checked(content, line_index, !currently)
}
