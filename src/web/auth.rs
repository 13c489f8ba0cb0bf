use crate::domain::messages;
use crate::domain::models::User;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(state)
}

async fn login(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "local".to_string());

    if !state.login_limiter.check(&client).await {
        tracing::warn!("Login rate limit exceeded for {}", client);
        return Err(ApiError::TooManyRequests(messages::LOGIN_THROTTLED));
    }

    let Json(payload) = payload.map_err(|e| {
        tracing::warn!("Malformed login request: {}", e);
        ApiError::bad_request(messages::MALFORMED_REQUEST)
    })?;

    let Some(user) = state.directory.authenticate(&payload.id, &payload.password) else {
        tracing::info!("Failed login for id {:?}", payload.id);
        return Err(ApiError::Unauthorized(messages::INVALID_CREDENTIALS));
    };

    tracing::info!("User {} logged in ({})", user.id, user.role.as_str());
    Ok(Json(LoginResponse {
        success: true,
        user,
    }))
}
