//! # lightsheet-server
//!
//! Backend for the light-dance choreography tools.
//!
//! This binary provides:
//! - **Versioned snapshot storage** for per-user light sheets, with a
//!   per-user retention cap and `LATEST` lookups
//! - **Chunked reads** so the frontend can page through one player's
//!   frame sequence
//! - **Raw edit-session saves** (opaque payloads, stored separately)
//! - **Music file storage** (per-user MP3 library)
//! - **Synthetic light-list generators** for firmware testing
//! - **REST API** (axum) with bearer-token auth on all write routes

mod api;
mod auth;
mod config;
mod error;
mod generator;
mod music_store;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lightsheet_store::{Database, RetentionPolicy, UserRecord};

use crate::api::AppState;
use crate::auth::AuthService;
use crate::config::ServerConfig;
use crate::music_store::MusicStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lightsheet_server=debug")),
        )
        .init();

    info!("Starting lightsheet server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Version store (runs migrations on open)
    let db = match &config.db_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    if let Some(path) = db.path() {
        info!(path = %path.display(), "Version store ready");
    }

    // Optional bootstrap user for fresh deployments
    if let Some((username, password)) = &config.bootstrap_user {
        let created = db.ensure_user(&UserRecord {
            username: username.clone(),
            password: password.clone(),
            disabled: false,
        })?;
        if created {
            info!(user = %username, "Created bootstrap user");
        }
    }

    let db = Arc::new(Mutex::new(db));

    // Music store (creates directory if missing)
    let music = Arc::new(MusicStore::new(config.music_path.clone()).await?);

    // Session-token auth over the user table
    let auth = AuthService::new(db.clone());

    // Application state for the HTTP API
    let app_state = AppState {
        db,
        auth,
        music,
        retention: RetentionPolicy::default(),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
