use crate::db::SharedStore;
use crate::directory::UserDirectory;
use crate::domain::models::{Questions, SurveySettings};
use crate::middleware::RateLimiter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<UserDirectory>,
    pub store: SharedStore,
    pub settings: SurveySettings,
    pub questions: Questions,
    pub login_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;
