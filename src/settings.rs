use crate::domain::models::{Questions, SurveySettings};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {what} {}", path.display()))
}

pub fn load_survey_settings(path: &Path) -> Result<SurveySettings> {
    let settings: SurveySettings = read_json(path, "survey config")?;
    check_period(&settings)?;
    tracing::info!(
        "Survey period {} ~ {}",
        settings.period.from,
        settings.period.to
    );
    Ok(settings)
}

pub fn check_period(settings: &SurveySettings) -> Result<()> {
    if settings.period.from > settings.period.to {
        anyhow::bail!(
            "survey period starts after it ends: {} > {}",
            settings.period.from,
            settings.period.to
        );
    }
    Ok(())
}

pub fn load_questions(path: &Path) -> Result<Questions> {
    read_json(path, "questions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_config_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"period": {"from": "2024-06-01", "to": "2024-06-30"}}"#)
            .unwrap();
        let settings = load_survey_settings(&path).unwrap();
        assert_eq!(settings.period.from.to_string(), "2024-06-01");
    }

    #[test]
    fn inverted_period_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"period": {"from": "2024-07-01", "to": "2024-06-30"}}"#)
            .unwrap();
        assert!(load_survey_settings(&path).is_err());
    }

    #[test]
    fn reads_questions_in_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(
            &path,
            r#"{"question": "오늘 강점을 얼마나 활용했나요?", "reflectionQuestion": "오늘의 성찰"}"#,
        )
        .unwrap();
        let questions = load_questions(&path).unwrap();
        assert_eq!(questions.reflection_question, "오늘의 성찰");
    }
}
