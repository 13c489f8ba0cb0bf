pub mod client;
pub mod config;
pub mod db;
pub mod directory;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod settings;
pub mod state;
pub mod web;

use crate::config::AppConfig;
use crate::db::{Backend, JsonFileStore, MemoryStore, PgResponseStore, SharedStore};
use crate::directory::UserDirectory;
use crate::middleware::RateLimiter;
use crate::state::{AppState, SharedState};
use anyhow::Context;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// API routes plus static assets, traced.
pub fn app(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        .merge(web::routes(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

pub async fn open_store(config: &AppConfig) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config.backend {
        Backend::Json => {
            let store = JsonFileStore::open(&config.responses_path)
                .await
                .with_context(|| {
                    format!("opening response file {}", config.responses_path.display())
                })?;
            tracing::info!("Using JSON response store at {}", store.path().display());
            Arc::new(store)
        }
        Backend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL missing")?;
            Arc::new(PgResponseStore::connect(url, config.database_max_connections).await?)
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory response store; responses are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

pub async fn build_state(config: &AppConfig) -> anyhow::Result<SharedState> {
    let directory = UserDirectory::load(&config.users_path)?;
    let settings = settings::load_survey_settings(&config.survey_config_path)?;
    let questions = settings::load_questions(&config.questions_path)?;
    let store = open_store(config).await?;

    Ok(Arc::new(AppState {
        directory: Arc::new(directory),
        store,
        settings,
        questions,
        login_limiter: RateLimiter::per_minute(config.login_rate_limit),
    }))
}
