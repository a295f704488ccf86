//! Chat sidebar, chat view, and the message composer.

use chrono::{DateTime, Utc};

use crate::models::{ChatEntity, ContentHint, ContentKind};
use crate::render::{format_relative_date, html_escape};

pub fn chat_sidebar(chats: &[ChatEntity], active_id: Option<&str>, now: DateTime<Utc>) -> String {
    let mut items = String::new();
    for chat in chats {
        let class = if Some(chat.id.as_str()) == active_id { " class=\"active\"" } else { "" };
        items.push_str(&format!(
            r#"<li{class}><a href="/chat/{id}">{title}<span class="chat-date">{date}</span></a></li>"#,
            class = class,
            id = html_escape(&chat.id),
            title = html_escape(&chat.title),
            date = format_relative_date(chat.updated_at, now),
        ));
    }

    format!(
        r#"<form method="POST" action="/chats"><button type="submit" class="btn">+ New chat</button></form>
<ul class="chat-list">{}</ul>"#,
        items
    )
}

/// Cards in a grid, or an empty-state hint.
pub fn content_grid(cards: &[String]) -> String {
    if cards.is_empty() {
        return r#"<div class="empty-state">Nothing here yet. Describe what you need below and pick a format, or let it be detected.</div>"#
            .to_string();
    }
    format!(r#"<div class="content-grid">{}</div>"#, cards.concat())
}

pub fn composer(chat_id: &str) -> String {
    let auto = ContentHint::Auto.style();
    let mut options = format!(
        r#"<option value="{}" selected>{} {}</option>"#,
        ContentHint::Auto.as_str(),
        auto.icon,
        auto.label
    );
    for kind in ContentKind::ALL {
        let style = kind.style();
        options.push_str(&format!(
            r#"<option value="{}">{} {}</option>"#,
            kind.as_str(),
            style.icon,
            style.label
        ));
    }

    format!(
        r#"<form class="composer" method="POST" action="/chat/{id}/messages">
    <textarea name="prompt" placeholder="Ask for a note, a table, a to-do list, a diagram..." required></textarea>
    <div class="composer-row">
        <label for="kind">Format</label>
        <select name="kind" id="kind">{options}</select>
        <span class="spacer"></span>
        <button type="submit" class="btn">Generate</button>
    </div>
</form>"#,
        id = html_escape(chat_id),
        options = options,
    )
}

pub fn chat_view(chat: &ChatEntity, grid_html: &str) -> String {
    let id = html_escape(&chat.id);
    format!(
        r#"<div class="chat-header">
    <h1>{title}</h1>
    <form class="inline-form" method="POST" action="/chat/{id}/rename">
        <input type="text" name="title" value="{title}" required>
        <button type="submit" class="btn secondary small">Rename</button>
    </form>
    <form class="inline-form" method="POST" action="/chat/{id}/delete" onsubmit="return confirm('Delete this chat and everything in it?');">
        <button type="submit" class="btn small delete-btn">Delete</button>
    </form>
</div>
{grid}
{composer}"#,
        title = html_escape(&chat.title),
        id = id,
        grid = grid_html,
        composer = composer(&chat.id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: &str, title: &str) -> ChatEntity {
        let now = Utc::now();
        ChatEntity {
            id: id.into(),
            user_id: "local".into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sidebar_marks_active_chat() {
        let chats = vec![chat("a", "First"), chat("b", "<Second>")];
        let html = chat_sidebar(&chats, Some("b"), Utc::now());
        assert!(html.contains(r#"<li class="active"><a href="/chat/b">&lt;Second&gt;"#));
        assert!(html.contains(r#"<li><a href="/chat/a">First"#));
    }

    #[test]
    fn test_composer_offers_every_kind() {
        let html = composer("c1");
        assert!(html.contains(r#"action="/chat/c1/messages""#));
        assert!(html.contains(r#"<option value="auto" selected>🤖 Auto</option>"#));
        for kind in ContentKind::ALL {
            assert!(html.contains(&format!(r#"value="{}""#, kind.as_str())));
        }
    }

    #[test]
    fn test_empty_grid_shows_hint() {
        assert!(content_grid(&[]).contains("empty-state"));
        assert!(content_grid(&["<div>x</div>".to_string()]).starts_with(r#"<div class="content-grid">"#));
    }
}
