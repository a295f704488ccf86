//! AI notes library - re-exports for testing and external use.
//!
//! Chats hold AI-generated content items of seven kinds (note, table,
//! checklist, diagram, link collection, chart, form). This crate classifies
//! and cleans generated text, renders each kind to HTML, hydrates diagrams
//! and charts, and serves it all over HTTP.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

pub mod auth;
pub mod checklist;
pub mod classify;
pub mod config;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod hydrate;
pub mod models;
pub mod render;
pub mod sanitize;
pub mod store;
pub mod templates;

use auth::Authenticator;
use config::Config;
use error::Result;
use generation::{CompletionBackend, OpenAiBackend};
use hydrate::Hydrator;
use render::Renderer;
use store::Store;
use templates::PageContext;

/// Base path checklist toggles are posted to.
pub const TOGGLE_ENDPOINT: &str = "/api/contents";

// ============================================================================
// Rate Limiting
// ============================================================================

/// Tracks login failures for rate limiting with exponential backoff.
#[derive(Debug, Default)]
pub struct LoginRateLimit {
    pub failures: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginRateLimit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if login attempts are currently locked out.
    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Record a failed login attempt. After 5 failures, apply exponential backoff capped at 64s.
    pub fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures >= 5 {
            let delay_secs = std::cmp::min(1i64 << (self.failures - 5).min(6), 64);
            self.locked_until = Some(Utc::now() + chrono::Duration::seconds(delay_secs));
        }
    }

    /// Reset on successful login.
    pub fn reset(&mut self) {
        self.failures = 0;
        self.locked_until = None;
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub backend: Arc<dyn CompletionBackend>,
    pub hydrator: Hydrator,
    pub renderer: Renderer,
    pub auth: Option<Arc<Authenticator>>,
    pub login_rate_limit: Arc<Mutex<LoginRateLimit>>,
}

impl AppState {
    /// Opens the database and connects the OpenAI backend from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let store = Store::open(&config.db_path)?;
        let backend = Arc::new(OpenAiBackend::new(config.generation.clone())?);
        Self::with_parts(config, store, backend)
    }

    pub fn with_parts(
        config: Config,
        store: Store,
        backend: Arc<dyn CompletionBackend>,
    ) -> Result<Self> {
        // Hash password at startup (Argon2id, done once)
        let auth = match config.password.as_deref() {
            Some(password) => Some(Arc::new(Authenticator::new(password)?)),
            None => None,
        };

        Ok(Self {
            config,
            store,
            backend,
            hydrator: Hydrator::default(),
            renderer: Renderer::with_toggle_endpoint(TOGGLE_ENDPOINT),
            auth,
            login_rate_limit: Arc::new(Mutex::new(LoginRateLimit::new())),
        })
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }

    pub fn page_context<'a>(&self, user: Option<&'a str>, notice: Option<&'a str>) -> PageContext<'a> {
        PageContext {
            user,
            auth_enabled: self.auth_enabled(),
            notice,
            client_hydration: !self.config.server_hydration,
        }
    }

    /// Activates diagrams and charts in `html` when the server does hydration.
    pub async fn hydrate(&self, html: String) -> String {
        if self.config.server_hydration {
            self.hydrator.hydrate_html(html).await
        } else {
            html
        }
    }
}

// Re-export commonly used types
pub use error::Error;
pub use models::{ChatEntity, ContentEntity, ContentHint, ContentKind, NewContent};

pub use checklist::{parse_items, set_item_checked, toggle_item, ChecklistError, ChecklistItem};
pub use classify::{classify, detect_kind};
pub use generation::{edit_content, generate_content, generate_title, Generated, DEFAULT_CHAT_TITLE};
pub use hydrate::{HydrationContext, HydrationError, HydrationReport, Surface};
pub use render::{build_preview, html_escape, is_valid_diagram_syntax, render_card, render_content};
pub use sanitize::{clean_diagram, clean_json, sanitize_for_kind, transliterate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_locks_after_five_failures() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..4 {
            limit.record_failure();
        }
        assert!(!limit.is_locked());
        limit.record_failure();
        assert!(limit.is_locked());
        limit.reset();
        assert!(!limit.is_locked());
        assert_eq!(limit.failures, 0);
    }

    #[test]
    fn test_rate_limit_backoff_is_capped() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..100 {
            limit.record_failure();
        }
        let until = limit.locked_until.unwrap();
        assert!(until <= Utc::now() + chrono::Duration::seconds(64));
    }
}
