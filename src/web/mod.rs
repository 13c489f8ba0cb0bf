pub mod auth;
pub mod responses;
pub mod survey;

use crate::state::SharedState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    let api = Router::new()
        .merge(auth::router(state.clone()))
        .merge(responses::router(state.clone()))
        .merge(survey::router(state));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}
