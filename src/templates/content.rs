//! Content detail page, edit forms, and the login form.

use chrono::{DateTime, Utc};

use crate::models::ContentEntity;
use crate::render::{copy_button, format_relative_date, html_escape};

/// Full view of one content item. `rendered` is the item's HTML fragment.
pub fn content_view(entity: &ContentEntity, rendered: &str, now: DateTime<Utc>) -> String {
    let style = entity.kind.style();
    let id = html_escape(&entity.id);

    format!(
        r#"<a class="back-link" href="/chat/{chat_id}">&larr; Back to chat</a>
<div class="content-detail" data-type="{kind}" data-id="{id}">
    <div class="content-type-badge" style="background: {color}20; color: {color};"><span>{icon}</span><span>{label}</span></div>
    <div class="content-body">{rendered}</div>
    <div class="content-actions">{copy}</div>
</div>
<div class="meta-block">
    <div class="meta-row"><span class="meta-label">Prompt</span><span class="meta-value">{prompt}</span></div>
    <div class="meta-row"><span class="meta-label">Model</span><span class="meta-value">{model}</span></div>
    <div class="meta-row"><span class="meta-label">Created</span><span class="meta-value">{date}</span></div>
</div>
<div class="edit-panels">
    <form class="edit-form" method="POST" action="/content/{id}/edit">
        <h3>Edit manually</h3>
        <textarea class="code" name="content" required>{content}</textarea>
        <button type="submit" class="btn">Save</button>
    </form>
    <form class="edit-form" method="POST" action="/content/{id}/ai-edit">
        <h3>Edit with AI</h3>
        <textarea name="instruction" placeholder="e.g. add a row for March, translate to French..." required></textarea>
        <button type="submit" class="btn">Apply</button>
    </form>
</div>
<form class="inline-form" method="POST" action="/content/{id}/delete" onsubmit="return confirm('Delete this item?');" style="margin-top: 1.5rem;">
    <button type="submit" class="btn delete-btn">Delete item</button>
</form>"#,
        chat_id = html_escape(&entity.chat_id),
        kind = entity.kind,
        id = id,
        color = style.color,
        icon = style.icon,
        label = style.label,
        rendered = rendered,
        prompt = html_escape(&entity.prompt),
        model = html_escape(&entity.model),
        date = format_relative_date(entity.created_at, now),
        content = html_escape(&entity.content),
        copy = copy_button(&entity.content),
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let message = error
        .map(|e| format!(r#"<div class="message error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    format!(
        r#"<div class="login-form">
    {message}
    <h1>Login</h1>
    <form method="POST" action="/login">
        <input type="text" name="username" placeholder="Name" autocomplete="username" autofocus required>
        <input type="password" name="password" placeholder="Password" autocomplete="current-password" required>
        <button type="submit">Login</button>
    </form>
</div>"#,
        message = message
    )
}
