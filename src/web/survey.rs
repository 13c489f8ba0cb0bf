use crate::domain::models::{Questions, SurveySettings};
use crate::state::SharedState;
use axum::{extract::State, routing::get, Json, Router};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/config", get(config))
        .route("/questions", get(questions))
        .with_state(state)
}

async fn config(State(state): State<SharedState>) -> Json<SurveySettings> {
    Json(state.settings.clone())
}

async fn questions(State(state): State<SharedState>) -> Json<Questions> {
    Json(state.questions.clone())
}
