use super::{merge, ResponseFilter, ResponseStore, StoreError};
use crate::domain::models::{ResponseEntry, ResponseKey, SurveyResponse};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<ResponseKey, SurveyResponse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
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
        records.insert(key, record.clone());
        Ok(record)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LabelScore;

    fn entry(pairs: &[(&str, u8)]) -> ResponseEntry {
        ResponseEntry {
            user_name: "김철수".into(),
            scores: pairs
                .iter()
                .map(|(label, score)| LabelScore {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
            reflection: Some("좋은 하루".into()),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn resubmission_replaces_in_place() {
        let store = MemoryStore::new();
        let key = ResponseKey::new("user1", "2024-06-01".parse().unwrap());

        store
            .upsert(key.clone(), entry(&[("집중력", 4), ("창의력", 5)]))
            .await
            .unwrap();
        store
            .upsert(key.clone(), entry(&[("집중력", 3), ("창의력", 3)]))
            .await
            .unwrap();

        let all = store.list(&ResponseFilter::all()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score_for("집중력"), Some(3));
        assert_eq!(all[0].score_for("창의력"), Some(3));
    }

    #[tokio::test]
    async fn list_is_date_ordered_and_filtered() {
        let store = MemoryStore::new();
        for (user, date) in [
            ("user2", "2024-06-03"),
            ("user1", "2024-06-02"),
            ("user1", "2024-06-01"),
        ] {
            store
                .upsert(
                    ResponseKey::new(user, date.parse().unwrap()),
                    entry(&[("집중력", 2)]),
                )
                .await
                .unwrap();
        }

        let mine = store.list(&ResponseFilter::for_user("user1")).await.unwrap();
        let dates: Vec<String> = mine.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-06-02"]);

        let all = store.list(&ResponseFilter::all()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
