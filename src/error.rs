use crate::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request-boundary failure. Every variant renders as
/// `{"success": false, "message": ...}` with a localized message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    TooManyRequests(&'static str),

    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn storage(message: &'static str, source: StoreError) -> Self {
        tracing::error!("{}: {}", message, source);
        ApiError::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = FailureBody {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
