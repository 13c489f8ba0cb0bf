use crate::domain::models::{LabelScore, Questions, SurveyResponse, SurveySettings, User, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with `{"success": false, "message": ...}`.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub user_id: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub scores: Vec<LabelScore>,
    pub reflection: String,
    pub timestamp: DateTime<Utc>,
}

/// What the survey client needs from a server.
#[async_trait]
pub trait SurveyApi: Send + Sync {
    async fn login(&self, id: &str, password: &str) -> Result<User, ClientError>;

    /// `user_id = None` asks for every user's responses, which only admins get.
    async fn responses(
        &self,
        user_id: Option<&str>,
        role: UserRole,
    ) -> Result<Vec<SurveyResponse>, ClientError>;

    async fn submit(&self, request: &SubmitRequest) -> Result<SurveyResponse, ClientError>;

    async fn config(&self) -> Result<SurveySettings, ClientError>;

    async fn questions(&self) -> Result<Questions, ClientError>;
}

#[derive(Deserialize)]
struct LoginBody {
    user: User,
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    responses: Vec<SurveyResponse>,
}

#[derive(Deserialize)]
struct SubmitBody {
    data: SurveyResponse,
}

#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct HttpSurveyApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSurveyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let message = resp
        .json::<FailureBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message: if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.as_str())
                .to_string()
        } else {
            message
        },
    })
}

#[async_trait]
impl SurveyApi for HttpSurveyApi {
    async fn login(&self, id: &str, password: &str) -> Result<User, ClientError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&serde_json::json!({ "id": id, "password": password }))
            .send()
            .await?;
        let body: LoginBody = decode(resp).await?;
        Ok(body.user)
    }

    async fn responses(
        &self,
        user_id: Option<&str>,
        role: UserRole,
    ) -> Result<Vec<SurveyResponse>, ClientError> {
        let mut query = vec![("role", role.as_str())];
        if let Some(user_id) = user_id {
            query.push(("userId", user_id));
        }
        let resp = self
            .http
            .get(self.url("/responses"))
            .query(&query)
            .send()
            .await?;
        let body: ResponsesBody = decode(resp).await?;
        Ok(body.responses)
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<SurveyResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/responses"))
            .json(request)
            .send()
            .await?;
        let body: SubmitBody = decode(resp).await?;
        Ok(body.data)
    }

    async fn config(&self) -> Result<SurveySettings, ClientError> {
        let resp = self.http.get(self.url("/config")).send().await?;
        decode(resp).await
    }

    async fn questions(&self) -> Result<Questions, ClientError> {
        let resp = self.http.get(self.url("/questions")).send().await?;
        decode(resp).await
    }
}
