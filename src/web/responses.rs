use crate::db::ResponseFilter;
use crate::domain::messages;
use crate::domain::models::{LabelScore, ResponseEntry, ResponseKey, SurveyResponse, UserRole};
use crate::domain::submission::is_valid_score;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/responses", get(list).post(submit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub responses: Vec<SurveyResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "answers")]
    pub scores: Option<Vec<LabelScore>>,
    pub reflection: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub data: SurveyResponse,
}

/// Admins without a `userId` see everything; every other request is scoped
/// to the given user.
pub fn visibility(params: &ListParams) -> Result<ResponseFilter, ApiError> {
    let role = params
        .role
        .as_deref()
        .and_then(|raw| UserRole::try_from(raw).ok())
        .unwrap_or_default();
    let user_id = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    match (role, user_id) {
        (UserRole::Admin, None) => Ok(ResponseFilter::all()),
        (_, Some(user_id)) => Ok(ResponseFilter::for_user(user_id)),
        (UserRole::User, None) => Err(ApiError::bad_request(messages::USER_ID_REQUIRED)),
    }
}

async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = visibility(&params)?;
    let responses = state
        .store
        .list(&filter)
        .await
        .map_err(|e| ApiError::storage(messages::LOAD_RESPONSES_FAILED, e))?;

    tracing::debug!(
        "Listed {} responses (user filter: {:?})",
        responses.len(),
        filter.user_id
    );
    Ok(Json(ListResponse { responses }))
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::bad_request(messages::DATE_REQUIRED))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(messages::MALFORMED_REQUEST))
}

fn check_scores(scores: Option<Vec<LabelScore>>) -> Result<Vec<LabelScore>, ApiError> {
    let scores = scores
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(messages::SCORES_REQUIRED))?;
    if scores.iter().any(|s| !is_valid_score(s.score)) {
        return Err(ApiError::bad_request(messages::SCORE_OUT_OF_RANGE));
    }
    Ok(scores)
}

async fn submit(
    State(state): State<SharedState>,
    payload: Result<Json<SubmitPayload>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::warn!("Malformed response submission: {}", e);
        ApiError::bad_request(messages::MALFORMED_REQUEST)
    })?;

    let user_id = payload
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(messages::USER_ID_REQUIRED))?
        .to_string();
    let date = parse_date(payload.date.as_deref())?;
    let scores = check_scores(payload.scores)?;

    let user_name = payload
        .user_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| state.directory.find(&user_id).map(|u| u.name))
        .unwrap_or_default();
    let reflection = payload
        .reflection
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let key = ResponseKey::new(user_id, date);
    let entry = ResponseEntry {
        user_name,
        scores,
        reflection,
        timestamp: payload.timestamp.unwrap_or_else(Utc::now),
    };

    let record = state
        .store
        .upsert(key, entry)
        .await
        .map_err(|e| ApiError::storage(messages::SAVE_FAILED, e))?;

    tracing::info!(
        "Saved response for {} on {} via {} backend",
        record.user_id,
        record.date,
        state.store.backend()
    );
    Ok(Json(SubmitResponse {
        success: true,
        data: record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(user_id: Option<&str>, role: Option<&str>) -> ListParams {
        ListParams {
            user_id: user_id.map(str::to_string),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn admin_without_user_sees_all() {
        let filter = visibility(&params(None, Some("admin"))).unwrap();
        assert_eq!(filter, ResponseFilter::all());
    }

    #[test]
    fn scoped_requests_follow_user_id() {
        let filter = visibility(&params(Some("user1"), Some("user"))).unwrap();
        assert_eq!(filter, ResponseFilter::for_user("user1"));

        let filter = visibility(&params(Some("user2"), Some("admin"))).unwrap();
        assert_eq!(filter, ResponseFilter::for_user("user2"));
    }

    #[test]
    fn non_admin_needs_user_id() {
        assert!(visibility(&params(None, Some("user"))).is_err());
        assert!(visibility(&params(Some("  "), None)).is_err());
    }

    #[test]
    fn scores_must_be_present_and_on_scale() {
        assert!(check_scores(None).is_err());
        assert!(check_scores(Some(vec![])).is_err());
        assert!(check_scores(Some(vec![LabelScore {
            label: "집중력".into(),
            score: 0
        }]))
        .is_err());
        assert!(check_scores(Some(vec![LabelScore {
            label: "집중력".into(),
            score: 5
        }]))
        .is_ok());
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(parse_date(Some("2024-06-01")).is_ok());
        assert!(parse_date(Some("06/01/2024")).is_err());
        assert!(parse_date(None).is_err());
    }
}
