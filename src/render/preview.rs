//! Condensed previews and grid cards for content entities.

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

use super::{html_escape, Renderer};
use crate::models::{ContentEntity, ContentKind};

pub const PREVIEW_MAX_CHARS: usize = 200;

const TABLE_PREVIEW_LINES: usize = 3;
const LIST_PREVIEW_LINES: usize = 5;

/// Truncates `content` the way the grid shows it, before rendering.
pub fn build_preview(content: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Table => first_lines(content, TABLE_PREVIEW_LINES),
        ContentKind::List => first_lines(content, LIST_PREVIEW_LINES),
        ContentKind::Link | ContentKind::Chart | ContentKind::Form => {
            let pretty = serde_json::from_str::<Value>(content)
                .ok()
                .and_then(|v| serde_json::to_string_pretty(&v).ok())
                .unwrap_or_else(|| content.to_string());
            first_chars(&pretty, PREVIEW_MAX_CHARS)
        }
        ContentKind::Note | ContentKind::Diagram => {
            let mut preview = first_chars(content, PREVIEW_MAX_CHARS);
            if content.chars().count() > PREVIEW_MAX_CHARS {
                preview.push_str("...");
            }
            preview
        }
    }
}

fn first_lines(content: &str, n: usize) -> String {
    content.split('\n').take(n).collect::<Vec<_>>().join("\n")
}

fn first_chars(content: &str, n: usize) -> String {
    content.chars().take(n).collect()
}

/// Grid card: kind badge, rendered preview, relative date.
///
/// Truncation keeps a prefix of the lines, so checklist indices in the
/// preview still address the stored content.
pub fn render_card(entity: &ContentEntity, renderer: &Renderer, now: DateTime<Utc>) -> String {
    let style = entity.kind.style();
    let preview = renderer.render(
        &build_preview(&entity.content, entity.kind),
        entity.kind,
        Some(&entity.id),
    );

    format!(
        r#"<div class="content-card" data-type="{kind}" data-id="{id}">
    <div class="content-type-badge" style="background: {color}20; color: {color};"><span>{icon}</span><span>{label}</span></div>
    <div class="content-preview">{preview}</div>
    <div class="content-footer"><span class="content-date">{date}</span>{copy}<a class="content-open" href="/content/{id}">Open</a></div>
</div>"#,
        id = html_escape(&entity.id),
        kind = entity.kind,
        color = style.color,
        icon = style.icon,
        label = style.label,
        preview = preview,
        date = format_relative_date(entity.created_at, now),
        copy = copy_button(&entity.content),
    )
}

/// Button whose click copies `text` verbatim; the page script handles it.
pub fn copy_button(text: &str) -> String {
    format!(
        r#"<button type="button" class="copy-btn" data-copy="{}" title="Copy">📋 Copy</button>"#,
        html_escape(text)
    )
}

pub fn format_relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date);

    if elapsed.num_seconds() < 60 {
        return "Just now".to_string();
    }
    if elapsed.num_minutes() < 60 {
        let mins = elapsed.num_minutes();
        return format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" });
    }
    if elapsed.num_hours() < 24 {
        let hours = elapsed.num_hours();
        return format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" });
    }

    if date.year() == now.year() {
        date.format("%-d %B").to_string()
    } else {
        date.format("%-d %B %Y").to_string()
    }
}
