use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            _ => Err(()),
        }
    }
}

/// Public view of a directory entry. Never carries the password.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Space-separated strength names, in display order.
    pub labels: String,
    pub role: UserRole,
}

impl User {
    pub fn label_list(&self) -> Vec<String> {
        split_labels(&self.labels)
    }
}

pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelScore {
    pub label: String,
    pub score: u8,
}

/// Composite identity of a response. At most one record exists per key.
///
/// Field order matters: keys sort by date first, then by user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ResponseKey {
    pub date: NaiveDate,
    pub user_id: String,
}

impl ResponseKey {
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
        }
    }
}

/// Everything a submission replaces when it is written for an existing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEntry {
    pub user_name: String,
    pub scores: Vec<LabelScore>,
    pub reflection: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub date: NaiveDate,
    #[serde(alias = "answers")]
    pub scores: Vec<LabelScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SurveyResponse {
    pub fn from_parts(
        key: ResponseKey,
        entry: ResponseEntry,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: key.user_id,
            user_name: entry.user_name,
            date: key.date,
            scores: entry.scores,
            reflection: entry.reflection,
            timestamp: entry.timestamp,
            created_at,
            updated_at,
        }
    }

    pub fn key(&self) -> ResponseKey {
        ResponseKey::new(self.user_id.clone(), self.date)
    }

    pub fn score_for(&self, label: &str) -> Option<u8> {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveySettings {
    pub period: Period,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Questions {
    pub question: String,
    pub reflection_question: String,
}
