//! AI notes server - chats of AI-generated notes, tables, checklists,
//! diagrams, link collections, charts, and forms.
//!
//! The application is organized into the following modules:
//!
//! - `generation`: Prompting the completion backend and cleaning its output
//! - `classify` / `sanitize`: Kind detection and per-kind cleanup
//! - `render` / `hydrate`: HTML rendering and diagram/chart activation
//! - `store`: Chats and content items in sled
//! - `auth`: Password login and signed session cookies
//! - `templates` / `handlers`: Pages and HTTP routes

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ainotes::{config::Config, handlers, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ainotes=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let bind = config.bind;
    let state = Arc::new(AppState::new(config)?);

    info!("Database: {}", state.config.db_path.display());
    info!("Model: {}", state.backend.model_name());
    if state.auth_enabled() {
        info!("Authentication: ENABLED (AINOTES_PASSWORD set)");
    } else {
        info!("Authentication: DISABLED (set AINOTES_PASSWORD to require login)");
    }
    if !state.config.server_hydration {
        info!("Diagrams and charts hydrate in the browser");
    }

    let app = handlers::router(state.clone());
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("AI notes server running at http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.store.flush().await?;
    info!("Database flushed, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
