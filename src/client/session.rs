use super::api::{ClientError, SubmitRequest, SurveyApi};
use crate::domain::messages;
use crate::domain::models::{Questions, SurveyResponse, SurveySettings, User};
use crate::domain::pivot::{self, ResultsTable};
use crate::domain::submission::{self, is_valid_score, SubmitError};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    shown_at: Instant,
}

impl Toast {
    fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < TOAST_TTL
    }
}

/// Which screen a signed-in user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Form,
    Results,
}

/// Top-level screen, including the signed-out one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Unauthenticated,
    Form,
    Results,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub view: View,
    pub scores: HashMap<String, u8>,
    pub reflection: String,
    pub responses: Vec<SurveyResponse>,
}

impl Session {
    fn new(user: User) -> Self {
        let mut session = Self {
            user,
            view: View::Form,
            scores: HashMap::new(),
            reflection: String::new(),
            responses: Vec::new(),
        };
        session.reset_draft();
        session
    }

    fn reset_draft(&mut self) {
        self.scores = self
            .user
            .label_list()
            .into_iter()
            .map(|label| (label, 0))
            .collect();
        self.reflection.clear();
    }

    fn prefill_from(&mut self, date: NaiveDate, responses: &[SurveyResponse]) {
        let own = responses
            .iter()
            .find(|r| r.date == date && r.user_id == self.user.id);
        match own {
            Some(existing) => {
                self.scores = existing
                    .scores
                    .iter()
                    .map(|s| (s.label.clone(), s.score))
                    .collect();
                self.reflection = existing.reflection.clone().unwrap_or_default();
            }
            None => self.reset_draft(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{}", messages::NOT_LOGGED_IN)]
    NotSignedIn,
    #[error(transparent)]
    Invalid(#[from] SubmitError),
    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Survey front end logic, independent of how it is rendered.
pub struct SurveyClient<A> {
    api: A,
    session: Option<Session>,
    settings: Option<SurveySettings>,
    questions: Questions,
    selected_date: NaiveDate,
    toast: Option<Toast>,
}

impl<A: SurveyApi> SurveyClient<A> {
    pub fn new(api: A, today: NaiveDate) -> Self {
        Self {
            api,
            session: None,
            settings: None,
            questions: Questions::default(),
            selected_date: today,
            toast: None,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.session.as_ref().map(|s| s.view) {
            None => Screen::Unauthenticated,
            Some(View::Form) => Screen::Form,
            Some(View::Results) => Screen::Results,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn settings(&self) -> Option<&SurveySettings> {
        self.settings.as_ref()
    }

    pub fn questions(&self) -> &Questions {
        &self.questions
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn score(&self, label: &str) -> u8 {
        self.session
            .as_ref()
            .and_then(|s| s.scores.get(label).copied())
            .unwrap_or(0)
    }

    pub fn reflection(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.reflection.as_str())
            .unwrap_or("")
    }

    pub fn responses(&self) -> &[SurveyResponse] {
        self.session
            .as_ref()
            .map(|s| s.responses.as_slice())
            .unwrap_or(&[])
    }

    /// The current notification, if it has not yet auto-dismissed.
    pub fn toast_at(&self, now: Instant) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_visible_at(now))
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast_at(Instant::now())
    }

    fn notify(&mut self, kind: ToastKind, text: impl Into<String>) {
        self.toast = Some(Toast::new(kind, text));
    }

    pub async fn load_config(&mut self) {
        match self.api.config().await {
            Ok(settings) => self.settings = Some(settings),
            Err(e) => tracing::warn!("{}: {}", messages::LOAD_CONFIG_FAILED, e),
        }
    }

    async fn load_questions(&mut self) {
        match self.api.questions().await {
            Ok(questions) => self.questions = questions,
            Err(e) => {
                tracing::warn!("Loading questions failed: {}", e);
                self.notify(ToastKind::Error, messages::LOAD_QUESTIONS_FAILED);
            }
        }
    }

    /// Reloads the responses the signed-in user may see: everything for an
    /// admin, otherwise their own.
    pub async fn load_responses(&mut self) -> Result<(), ActionError> {
        let (user_id, role) = {
            let session = self.session.as_ref().ok_or(ActionError::NotSignedIn)?;
            let user_id = (!session.user.role.is_admin()).then(|| session.user.id.clone());
            (user_id, session.user.role)
        };

        match self.api.responses(user_id.as_deref(), role).await {
            Ok(mut responses) => {
                responses.sort_by_key(SurveyResponse::key);
                if let Some(session) = self.session.as_mut() {
                    session.responses = responses;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Loading responses failed: {}", e);
                self.notify(ToastKind::Error, messages::LOAD_RESPONSES_FAILED);
                Err(e.into())
            }
        }
    }

    /// Fetches the user's own responses and fills the draft for the selected
    /// date, or resets it to zeros when nothing was stored for that day.
    async fn prefill_selected_date(&mut self) {
        let (user_id, role) = match self.session.as_ref() {
            Some(session) if session.view == View::Form => {
                (session.user.id.clone(), session.user.role)
            }
            _ => return,
        };

        match self.api.responses(Some(&user_id), role).await {
            Ok(responses) => {
                let date = self.selected_date;
                if let Some(session) = self.session.as_mut() {
                    session.prefill_from(date, &responses);
                }
            }
            Err(e) => tracing::warn!("Loading scores for {} failed: {}", self.selected_date, e),
        }
    }

    pub async fn login(&mut self, id: &str, password: &str) -> Result<&User, ActionError> {
        let user = match self.api.login(id, password).await {
            Ok(user) => user,
            Err(e) => {
                let text = match &e {
                    ClientError::Rejected { message, .. } => message.clone(),
                    ClientError::Transport(_) => messages::LOGIN_REQUEST_FAILED.to_string(),
                };
                self.notify(ToastKind::Error, text);
                return Err(e.into());
            }
        };

        tracing::info!("Signed in as {}", user.id);
        let greeting = messages::welcome(&user.name);
        self.session = Some(Session::new(user));
        self.notify(ToastKind::Success, greeting);

        if self.settings.is_none() {
            self.load_config().await;
        }
        self.load_questions().await;
        // A failed load has already produced a toast.
        let _ = self.load_responses().await;
        self.prefill_selected_date().await;

        self.user().ok_or(ActionError::NotSignedIn)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("Signed out {}", session.user.id);
        }
        self.toast = None;
    }

    pub async fn show_form(&mut self) -> Result<(), ActionError> {
        let session = self.session.as_mut().ok_or(ActionError::NotSignedIn)?;
        session.view = View::Form;
        self.prefill_selected_date().await;
        Ok(())
    }

    pub async fn show_results(&mut self) -> Result<(), ActionError> {
        let session = self.session.as_mut().ok_or(ActionError::NotSignedIn)?;
        session.view = View::Results;
        self.load_responses().await
    }

    pub async fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.prefill_selected_date().await;
    }

    /// Sets one label's score. Returns false for labels the user does not
    /// rate or for values off the 1-5 scale.
    pub fn set_score(&mut self, label: &str, score: u8) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !is_valid_score(score) || !session.user.label_list().iter().any(|l| l == label) {
            return false;
        }
        session.scores.insert(label.to_string(), score);
        true
    }

    pub fn set_reflection(&mut self, text: impl Into<String>) {
        if let Some(session) = self.session.as_mut() {
            session.reflection = text.into();
        }
    }

    /// Validates the draft and upserts it for the selected date.
    pub async fn submit(&mut self, now: DateTime<Utc>) -> Result<SurveyResponse, ActionError> {
        let date = self.selected_date;
        let request = {
            let session = self.session.as_ref().ok_or(ActionError::NotSignedIn)?;
            let labels = session.user.label_list();
            let scores = submission::validate(
                date,
                self.settings.as_ref().map(|s| &s.period),
                &labels,
                &session.scores,
            );
            match scores {
                Ok(scores) => SubmitRequest {
                    user_id: session.user.id.clone(),
                    user_name: session.user.name.clone(),
                    date,
                    scores,
                    reflection: session.reflection.trim().to_string(),
                    timestamp: now,
                },
                Err(invalid) => {
                    if let SubmitError::OutOfPeriod { date, period } = &invalid {
                        tracing::info!(
                            "Rejected draft for {}, outside {}..={}",
                            date,
                            period.from,
                            period.to
                        );
                    }
                    self.notify(ToastKind::Error, invalid.to_string());
                    return Err(invalid.into());
                }
            }
        };

        match self.api.submit(&request).await {
            Ok(saved) => {
                self.notify(ToastKind::Success, messages::SAVE_SUCCEEDED);
                let _ = self.load_responses().await;
                // The reload may have replaced the success toast with an error.
                Ok(saved)
            }
            Err(e) => {
                let text = match &e {
                    ClientError::Rejected { message, .. } => message.clone(),
                    ClientError::Transport(_) => messages::SAVE_FAILED.to_string(),
                };
                self.notify(ToastKind::Error, text);
                Err(e.into())
            }
        }
    }

    /// Pivot of the loaded responses, or `None` when signed out or empty.
    pub fn results_table(&self) -> Option<ResultsTable> {
        let session = self.session.as_ref()?;
        if session.responses.is_empty() {
            return None;
        }
        Some(pivot::build_table(&session.user, &session.responses))
    }
}
