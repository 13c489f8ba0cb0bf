pub mod json_file;
pub mod memory;
pub mod postgres;

use crate::domain::models::{ResponseEntry, ResponseKey, SurveyResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use postgres::PgResponseStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFilter {
    /// `None` selects every user's responses.
    pub user_id: Option<String>,
}

impl ResponseFilter {
    pub fn all() -> Self {
        Self { user_id: None }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn matches(&self, key: &ResponseKey) -> bool {
        self.user_id
            .as_deref()
            .map_or(true, |user_id| user_id == key.user_id)
    }
}

/// Persistence for survey responses. Implementations hold at most one record
/// per [`ResponseKey`] and list records in key order (date, then user).
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn list(&self, filter: &ResponseFilter) -> Result<Vec<SurveyResponse>, StoreError>;

    /// Replaces the entry stored under `key`, or inserts it. `created_at`
    /// survives replacement; `updated_at` is refreshed.
    async fn upsert(&self, key: ResponseKey, entry: ResponseEntry)
        -> Result<SurveyResponse, StoreError>;

    fn backend(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn ResponseStore>;

/// Record produced by an upsert over an optional existing record.
pub(crate) fn merge(
    existing: Option<&SurveyResponse>,
    key: ResponseKey,
    entry: ResponseEntry,
    now: DateTime<Utc>,
) -> SurveyResponse {
    let created_at = existing.map_or(now, |prev| prev.created_at);
    SurveyResponse::from_parts(key, entry, created_at, now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    Postgres,
    Memory,
}

impl TryFrom<&str> for Backend {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "json" | "file" => Ok(Backend::Json),
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}
