use super::{ResponseFilter, ResponseStore, StoreError};
use crate::domain::models::{LabelScore, ResponseEntry, ResponseKey, SurveyResponse};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

const RETURNED_COLUMNS: &str =
    "user_id, user_name, date, scores, reflection, submitted_at, created_at, updated_at";

/// Hosted table backend. Uniqueness of (user_id, date) is a table constraint,
/// so concurrent writers resolve to last-write-wins inside Postgres.
pub struct PgResponseStore {
    pool: PgPool,
}

impl PgResponseStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;
        tracing::info!("Database migrations completed");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_response(row: &PgRow) -> Result<SurveyResponse, sqlx::Error> {
    let scores: Json<Vec<LabelScore>> = row.try_get("scores")?;
    Ok(SurveyResponse {
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        date: row.try_get::<NaiveDate, _>("date")?,
        scores: scores.0,
        reflection: row.try_get("reflection")?,
        timestamp: row.try_get::<DateTime<Utc>, _>("submitted_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ResponseStore for PgResponseStore {
    async fn list(&self, filter: &ResponseFilter) -> Result<Vec<SurveyResponse>, StoreError> {
        let sql = format!(
            r#"
            SELECT {RETURNED_COLUMNS}
            FROM responses
            WHERE ($1::TEXT IS NULL OR user_id = $1)
            ORDER BY date ASC, user_id ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.user_id.as_deref())
            .fetch_all(&self.pool)
            .await?;

        let responses = rows
            .iter()
            .map(row_to_response)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(responses)
    }

    async fn upsert(
        &self,
        key: ResponseKey,
        entry: ResponseEntry,
    ) -> Result<SurveyResponse, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO responses
                (id, user_id, user_name, date, scores, reflection, submitted_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (user_id, date) DO UPDATE SET
                user_name = EXCLUDED.user_name,
                scores = EXCLUDED.scores,
                reflection = EXCLUDED.reflection,
                submitted_at = EXCLUDED.submitted_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {RETURNED_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&key.user_id)
            .bind(&entry.user_name)
            .bind(key.date)
            .bind(Json(&entry.scores))
            .bind(entry.reflection.as_deref())
            .bind(entry.timestamp)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row_to_response(&row)?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Option<PgResponseStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        };
        Some(PgResponseStore::connect(&url, 2).await.unwrap())
    }

    fn entry(pairs: &[(&str, u8)], reflection: Option<&str>) -> ResponseEntry {
        ResponseEntry {
            user_name: "김철수".into(),
            scores: pairs
                .iter()
                .map(|(label, score)| LabelScore {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
            reflection: reflection.map(str::to_string),
            timestamp: Utc::now(),
        }
    }

    async fn remove(store: &PgResponseStore, user_ids: &[&str]) {
        let ids: Vec<String> = user_ids.iter().map(|id| id.to_string()).collect();
        sqlx::query("DELETE FROM responses WHERE user_id = ANY($1)")
            .bind(&ids)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn resubmission_updates_the_single_row() {
        let Some(store) = store().await else { return };
        let user = format!("pg-{}", Uuid::new_v4());
        let key = ResponseKey::new(&user, "2024-06-01".parse().unwrap());

        let first = store
            .upsert(key.clone(), entry(&[("집중력", 4), ("창의력", 5)], None))
            .await
            .unwrap();
        let second = store
            .upsert(key.clone(), entry(&[("집중력", 3), ("창의력", 3)], Some("회고")))
            .await
            .unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let rows = store.list(&ResponseFilter::for_user(&user)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key(), key);
        assert_eq!(
            rows[0].scores,
            vec![
                LabelScore {
                    label: "집중력".into(),
                    score: 3
                },
                LabelScore {
                    label: "창의력".into(),
                    score: 3
                },
            ]
        );
        assert_eq!(rows[0].reflection.as_deref(), Some("회고"));
        assert_eq!(rows[0].created_at, first.created_at);

        remove(&store, &[&user]).await;
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn listing_filters_by_user_and_orders_by_date() {
        let Some(store) = store().await else { return };
        let run = Uuid::new_v4();
        let first_user = format!("pg-a-{run}");
        let second_user = format!("pg-b-{run}");

        for (user, date) in [
            (&second_user, "2024-06-02"),
            (&first_user, "2024-06-03"),
            (&first_user, "2024-06-01"),
            (&second_user, "2024-06-01"),
        ] {
            store
                .upsert(
                    ResponseKey::new(user.as_str(), date.parse().unwrap()),
                    entry(&[("공감", 2)], None),
                )
                .await
                .unwrap();
        }

        let own = store
            .list(&ResponseFilter::for_user(&first_user))
            .await
            .unwrap();
        let dates: Vec<String> = own.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-06-03"]);
        assert!(own.iter().all(|r| r.user_id == first_user));

        let ours: Vec<ResponseKey> = store
            .list(&ResponseFilter::all())
            .await
            .unwrap()
            .iter()
            .map(SurveyResponse::key)
            .filter(|key| key.user_id == first_user || key.user_id == second_user)
            .collect();
        let mut expected = ours.clone();
        expected.sort();
        assert_eq!(ours.len(), 4);
        assert_eq!(ours, expected);

        remove(&store, &[&first_user, &second_user]).await;
    }
}
