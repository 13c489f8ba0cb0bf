use super::{merge, ResponseFilter, ResponseStore, StoreError};
use crate::domain::models::{LabelScore, ResponseEntry, ResponseKey, SurveyResponse};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// On-disk shape: `{"responses": [...]}`.
#[derive(Serialize)]
struct ResponseDocument<'a> {
    responses: Vec<&'a SurveyResponse>,
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    responses: Vec<StoredRecord>,
}

/// A record as found on disk. Files written before upserts existed carry
/// only `timestamp` (or nothing) instead of `createdAt`/`updatedAt`, and may
/// use `answers` for the scores.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    user_id: String,
    #[serde(default)]
    user_name: String,
    date: NaiveDate,
    #[serde(default, alias = "answers")]
    scores: Vec<LabelScore>,
    #[serde(default)]
    reflection: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    fn into_response(self, loaded_at: DateTime<Utc>) -> SurveyResponse {
        let timestamp = self
            .timestamp
            .or(self.updated_at)
            .or(self.created_at)
            .unwrap_or(loaded_at);
        let created_at = self.created_at.unwrap_or(timestamp);
        let updated_at = self.updated_at.unwrap_or(timestamp);

        SurveyResponse {
            user_id: self.user_id,
            user_name: self.user_name,
            date: self.date,
            scores: self.scores,
            reflection: self.reflection.filter(|text| !text.trim().is_empty()),
            timestamp,
            created_at,
            updated_at,
        }
    }
}

/// Flat JSON document store. The whole document is cached in memory and
/// rewritten on every upsert while the write lock is held.
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<BTreeMap<ResponseKey, SurveyResponse>>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load_document(&path).await?;
        tracing::info!(
            "Loaded {} responses from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn load_document(path: &Path) -> Result<BTreeMap<ResponseKey, SurveyResponse>, StoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{} not found, starting with no responses", path.display());
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(e.into()),
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }

    let document: StoredDocument = serde_json::from_slice(&raw)?;
    let loaded_at = Utc::now();
    let mut records: BTreeMap<ResponseKey, SurveyResponse> = BTreeMap::new();
    for stored in document.responses {
        let mut record = stored.into_response(loaded_at);
        let key = record.key();
        // Older documents were appended to instead of upserted; the last
        // occurrence of a key wins but keeps the first creation time.
        if let Some(previous) = records.get(&key) {
            tracing::warn!(
                "Duplicate response for {} on {} in {}, keeping the later one",
                key.user_id,
                key.date,
                path.display()
            );
            record.created_at = record.created_at.min(previous.created_at);
        }
        records.insert(key, record);
    }
    Ok(records)
}

async fn write_document(
    path: &Path,
    records: &BTreeMap<ResponseKey, SurveyResponse>,
) -> Result<(), StoreError> {
    let document = ResponseDocument {
        responses: records.values().collect(),
    };
    let body = serde_json::to_vec_pretty(&document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl ResponseStore for JsonFileStore {
    async fn list(&self, filter: &ResponseFilter) -> Result<Vec<SurveyResponse>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|(key, _)| filter.matches(key))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert(
        &self,
        key: ResponseKey,
        entry: ResponseEntry,
    ) -> Result<SurveyResponse, StoreError> {
        let mut records = self.records.write().await;
        let record = merge(records.get(&key), key.clone(), entry, Utc::now());
        let previous = records.insert(key.clone(), record.clone());

        if let Err(e) = write_document(&self.path, &records).await {
            // Keep the cache in step with what is on disk.
            match previous {
                Some(previous) => records.insert(key, previous),
                None => records.remove(&key),
            };
            return Err(e);
        }
        Ok(record)
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}
