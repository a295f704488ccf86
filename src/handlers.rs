//! HTTP route handlers for the web application.
//!
//! Page handlers answer with HTML. When an action fails for a reason the
//! user can act on (generation failed, empty prompt) they redirect back with
//! a `?notice=` that the page shows as a toast. The checklist API answers
//! with JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::auth::{clear_session_cookie, current_user, normalize_username, session_cookie};
use crate::checklist::set_item_checked;
use crate::error::{Error, Result};
use crate::generation::{edit_content, generate_content, generate_title, DEFAULT_CHAT_TITLE};
use crate::models::{
    AiEditForm, ContentEntity, ContentKind, LoginForm, ManualEditForm, NewContent, NoticeQuery,
    RenameChatForm, SendMessageForm, ToggleItemRequest, ToggleItemResponse,
};
use crate::render::{html_escape, render_card};
use crate::templates::{
    app_layout, base_html, chat_sidebar, chat_view, content_grid, content_view, login_page as login_form,
};
use crate::AppState;

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        // Chat routes
        .route("/chats", post(new_chat))
        .route("/chat/{id}", get(chat_page))
        .route("/chat/{id}/rename", post(rename_chat))
        .route("/chat/{id}/delete", post(delete_chat))
        .route("/chat/{id}/messages", post(send_message))
        // Content routes
        .route("/content/{id}", get(content_page))
        .route("/content/{id}/edit", post(manual_edit))
        .route("/content/{id}/ai-edit", post(ai_edit))
        .route("/content/{id}/delete", post(delete_content))
        // API routes
        .route("/api/contents/{id}/items/{index}", post(toggle_checklist_item))
        .with_state(state)
}

// ============================================================================
// Helpers
// ============================================================================

/// The acting user, or a redirect to the login page.
fn page_user(state: &AppState, jar: &CookieJar) -> std::result::Result<String, Response> {
    current_user(jar, state.auth.as_deref()).ok_or_else(|| Redirect::to("/login").into_response())
}

fn redirect_with_notice(path: &str, notice: &str) -> Response {
    let encoded: String = url::form_urlencoded::byte_serialize(notice.as_bytes()).collect();
    Redirect::to(&format!("{}?notice={}", path, encoded)).into_response()
}

fn error_page(state: &AppState, user: &str, err: &Error) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!("{}", err);
    }
    let body = format!(
        r#"<main class="main"><div class="message error">{}</div><a href="/">&larr; Back to chats</a></main>"#,
        html_escape(&err.to_string())
    );
    let ctx = state.page_context(Some(user), None);
    (status, Html(base_html("Error", &body, &ctx))).into_response()
}

/// Redirects to `success` or back to `fallback` with the error as a notice.
/// Missing records get an error page instead, since there is nothing to go back to.
fn finish(state: &AppState, user: &str, result: Result<String>, fallback: &str) -> Response {
    match result {
        Ok(location) => Redirect::to(&location).into_response(),
        Err(e @ Error::NotFound(_)) => error_page(state, user, &e),
        Err(e) => {
            warn!("{}", e);
            redirect_with_notice(fallback, &e.to_string())
        }
    }
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput(format!("{} cannot be empty", what)))
    } else {
        Ok(trimmed)
    }
}

// ============================================================================
// Index Handler
// ============================================================================

/// Opens the most recent chat, starting one if the user has none.
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let latest = state.store.list_chats(&user).and_then(|chats| match chats.into_iter().next() {
        Some(chat) => Ok(chat),
        None => state.store.create_chat(&user, DEFAULT_CHAT_TITLE),
    });

    match latest {
        Ok(chat) => Redirect::to(&format!("/chat/{}", chat.id)).into_response(),
        Err(e) => error_page(&state, &user, &e),
    }
}

// ============================================================================
// Chat Handlers
// ============================================================================

pub async fn chat_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let loaded = state.store.get_chat(&user, &id).and_then(|chat| {
        let chats = state.store.list_chats(&user)?;
        let contents = state.store.list_contents(&user, &chat.id)?;
        Ok((chat, chats, contents))
    });
    let (chat, chats, contents) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return error_page(&state, &user, &e),
    };

    let now = Utc::now();
    let cards: Vec<String> = contents
        .iter()
        .map(|content| render_card(content, &state.renderer, now))
        .collect();
    let grid = state.hydrate(content_grid(&cards)).await;

    let page = app_layout(
        &chat_sidebar(&chats, Some(&chat.id), now),
        &chat_view(&chat, &grid),
    );
    let ctx = state.page_context(Some(&user), query.notice.as_deref());
    Html(base_html(&chat.title, &page, &ctx)).into_response()
}

pub async fn new_chat(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let result = state
        .store
        .create_chat(&user, DEFAULT_CHAT_TITLE)
        .map(|chat| format!("/chat/{}", chat.id));
    finish(&state, &user, result, "/")
}

pub async fn rename_chat(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<RenameChatForm>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let chat_url = format!("/chat/{}", id);
    let result = state
        .store
        .rename_chat(&user, &id, &form.title)
        .map(|_| chat_url.clone());
    finish(&state, &user, result, &chat_url)
}

pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let result = state.store.delete_chat(&user, &id).map(|removed| {
        info!("Deleted chat {} ({} items)", id, removed);
        "/".to_string()
    });
    finish(&state, &user, result, &format!("/chat/{}", id))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<SendMessageForm>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let chat_url = format!("/chat/{}", id);
    let result = create_from_prompt(&state, &user, &id, form)
        .await
        .map(|_| chat_url.clone());
    finish(&state, &user, result, &chat_url)
}

/// Generates, stores, and files one content item under the chat. A chat
/// that still has the default title is named after its first prompt.
async fn create_from_prompt(
    state: &AppState,
    user: &str,
    chat_id: &str,
    form: SendMessageForm,
) -> Result<ContentEntity> {
    let prompt = non_empty(&form.prompt, "Prompt")?;
    let chat = state.store.get_chat(user, chat_id)?;

    let generated = generate_content(state.backend.as_ref(), prompt, form.kind).await?;
    let content = state.store.create_content(NewContent {
        chat_id: chat.id.clone(),
        user_id: user.to_string(),
        kind: generated.kind,
        content: generated.content,
        prompt: prompt.to_string(),
        model: generated.model,
    })?;
    state.store.touch_chat(user, &chat.id)?;
    info!("Generated {} item {} in chat {}", content.kind, content.id, chat.id);

    if chat.title == DEFAULT_CHAT_TITLE {
        let title = generate_title(state.backend.as_ref(), prompt).await;
        if title != DEFAULT_CHAT_TITLE {
            state.store.rename_chat(user, &chat.id, &title)?;
        }
    }

    Ok(content)
}

// ============================================================================
// Content Handlers
// ============================================================================

pub async fn content_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let loaded = state
        .store
        .get_content(&user, &id)
        .and_then(|entity| Ok((entity, state.store.list_chats(&user)?)));
    let (entity, chats) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return error_page(&state, &user, &e),
    };

    let now = Utc::now();
    let rendered = state
        .hydrate(state.renderer.render(&entity.content, entity.kind, Some(&entity.id)))
        .await;

    let page = app_layout(
        &chat_sidebar(&chats, Some(&entity.chat_id), now),
        &content_view(&entity, &rendered, now),
    );
    let ctx = state.page_context(Some(&user), query.notice.as_deref());
    Html(base_html(entity.kind.style().label, &page, &ctx)).into_response()
}

pub async fn manual_edit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<ManualEditForm>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let content_url = format!("/content/{}", id);
    let result = non_empty(&form.content, "Content")
        .and_then(|text| state.store.update_content(&user, &id, text))
        .and_then(|entity| state.store.touch_chat(&user, &entity.chat_id))
        .map(|_| content_url.clone());
    finish(&state, &user, result, &content_url)
}

pub async fn ai_edit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<AiEditForm>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let content_url = format!("/content/{}", id);
    let result = revise_with_instruction(&state, &user, &id, &form.instruction)
        .await
        .map(|_| content_url.clone());
    finish(&state, &user, result, &content_url)
}

async fn revise_with_instruction(
    state: &AppState,
    user: &str,
    content_id: &str,
    instruction: &str,
) -> Result<ContentEntity> {
    let instruction = non_empty(instruction, "Edit instruction")?;
    let entity = state.store.get_content(user, content_id)?;
    let revised = edit_content(state.backend.as_ref(), &entity.content, instruction, entity.kind).await?;
    // The revision is based on what was read before the model call.
    let updated = state.store.modify_content(user, &entity.id, |current| {
        if current.content != entity.content {
            return Err(Error::InvalidInput(
                "the item changed while it was being revised, try again".to_string(),
            ));
        }
        Ok(revised.clone())
    })?;
    state.store.touch_chat(user, &entity.chat_id)?;
    info!("Revised {} item {}", updated.kind, updated.id);
    Ok(updated)
}

pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let user = match page_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let result = state
        .store
        .delete_content(&user, &id)
        .map(|entity| format!("/chat/{}", entity.chat_id));
    finish(&state, &user, result, &format!("/content/{}", id))
}

// ============================================================================
// Checklist API
// ============================================================================

/// Rewrites one checklist line and persists the whole content.
pub async fn toggle_checklist_item(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, index)): Path<(String, usize)>,
    Json(request): Json<ToggleItemRequest>,
) -> Result<Json<ToggleItemResponse>> {
    let user = current_user(&jar, state.auth.as_deref()).ok_or(Error::Unauthorized)?;
    let saved = state.store.modify_content(&user, &id, |entity| {
        if entity.kind != ContentKind::List {
            return Err(Error::InvalidInput(format!("{} is not a checklist", entity.kind)));
        }
        Ok(set_item_checked(&entity.content, index, request.checked)?)
    })?;

    Ok(Json(ToggleItemResponse {
        ok: true,
        content: saved.content,
    }))
}

// ============================================================================
// Authentication Handlers
// ============================================================================

fn login_response(state: &AppState, status: StatusCode, error: Option<&str>) -> Response {
    let ctx = state.page_context(None, None);
    (status, Html(base_html("Login", &login_form(error), &ctx))).into_response()
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if !state.auth_enabled() || current_user(&jar, state.auth.as_deref()).is_some() {
        return Redirect::to("/").into_response();
    }
    login_response(&state, StatusCode::OK, None)
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(auth) = state.auth.clone() else {
        return Redirect::to("/").into_response();
    };

    let locked = state
        .login_rate_limit
        .lock()
        .map(|limit| limit.is_locked())
        .unwrap_or(true);
    if locked {
        return login_response(
            &state,
            StatusCode::TOO_MANY_REQUESTS,
            Some("Too many failed attempts. Try again in a minute."),
        );
    }

    let username = match normalize_username(&form.username) {
        Ok(name) => name,
        Err(e) => return login_response(&state, StatusCode::BAD_REQUEST, Some(&e.to_string())),
    };

    if !auth.verify_password(&form.password) {
        if let Ok(mut limit) = state.login_rate_limit.lock() {
            limit.record_failure();
        }
        warn!("Failed login attempt for {}", username);
        return login_response(&state, StatusCode::UNAUTHORIZED, Some("Invalid password."));
    }

    if let Ok(mut limit) = state.login_rate_limit.lock() {
        limit.reset();
    }

    let token = match auth.create_session(&username) {
        Ok(token) => token,
        Err(e) => return error_page(&state, &username, &e),
    };
    info!("{} logged in", username);

    let mut headers = HeaderMap::new();
    match session_cookie(&token).parse() {
        Ok(value) => {
            headers.insert(SET_COOKIE, value);
        }
        Err(_) => return error_page(&state, &username, &Error::Config("invalid session cookie".into())),
    }
    (headers, Redirect::to("/")).into_response()
}

pub async fn logout() -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = clear_session_cookie().parse() {
        headers.insert(SET_COOKIE, value);
    }
    (headers, Redirect::to("/login")).into_response()
}
