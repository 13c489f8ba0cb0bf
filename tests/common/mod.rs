#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use strength_journal::db::{MemoryStore, SharedStore};
use strength_journal::directory::{DirectoryUser, UserDirectory};
use strength_journal::domain::models::{Period, Questions, SurveySettings, UserRole};
use strength_journal::middleware::RateLimiter;
use strength_journal::state::AppState;
use strength_journal::web;

fn user(id: &str, password: &str, name: &str, labels: &str, role: UserRole) -> DirectoryUser {
    DirectoryUser {
        id: id.into(),
        password: password.into(),
        name: name.into(),
        labels: labels.into(),
        role,
    }
}

pub fn directory() -> UserDirectory {
    UserDirectory::new(vec![
        user("admin", "admin123", "관리자", "리더십", UserRole::Admin),
        user("user1", "user123", "김철수", "집중력 창의력", UserRole::User),
        user("user2", "user123", "이영희", "공감 배움", UserRole::User),
    ])
    .expect("valid directory")
}

pub fn settings() -> SurveySettings {
    SurveySettings {
        period: Period {
            from: "2024-06-01".parse().unwrap(),
            to: "2024-06-30".parse().unwrap(),
        },
    }
}

pub fn questions() -> Questions {
    Questions {
        question: "오늘 나의 강점을 얼마나 활용했나요?".into(),
        reflection_question: "오늘의 성찰".into(),
    }
}

pub fn app_with(store: SharedStore, login_limit: usize) -> Router {
    let state = Arc::new(AppState {
        directory: Arc::new(directory()),
        store,
        settings: settings(),
        questions: questions(),
        login_limiter: RateLimiter::per_minute(login_limit),
    });
    web::routes(state)
}

pub fn app() -> Router {
    app_with(Arc::new(MemoryStore::new()), 100)
}

pub async fn json_response(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("invalid json");
    (status, value)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
