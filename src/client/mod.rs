//! Survey front end: an explicit screen state machine over a [`SurveyApi`].
pub mod api;
pub mod render;
pub mod session;

pub use api::{ClientError, HttpSurveyApi, SubmitRequest, SurveyApi};
pub use session::{ActionError, Screen, SurveyClient, Toast, ToastKind, View};
