use crate::domain::messages;
use crate::domain::models::{LabelScore, Period};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("날짜는 {}부터 {} 사이여야 합니다.", .period.from, .period.to)]
    OutOfPeriod { date: NaiveDate, period: Period },
    #[error("{}", messages::INCOMPLETE_SCORES)]
    Incomplete { missing: Vec<String> },
    #[error("{}", messages::SCORE_OUT_OF_RANGE)]
    ScoreOutOfRange { label: String, score: u8 },
}

pub fn is_valid_score(score: u8) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Checks a draft against the survey window and the viewer's label set and
/// returns the scores in label order, ready to send.
///
/// The period check runs first, so an out-of-window draft is reported as such
/// even when it is also incomplete.
pub fn validate(
    date: NaiveDate,
    period: Option<&Period>,
    labels: &[String],
    scores: &HashMap<String, u8>,
) -> Result<Vec<LabelScore>, SubmitError> {
    if let Some(period) = period {
        if !period.contains(date) {
            return Err(SubmitError::OutOfPeriod {
                date,
                period: *period,
            });
        }
    }

    let missing: Vec<String> = labels
        .iter()
        .filter(|label| scores.get(label.as_str()).copied().unwrap_or(0) == 0)
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SubmitError::Incomplete { missing });
    }

    labels
        .iter()
        .map(|label| {
            let score = scores[label.as_str()];
            if is_valid_score(score) {
                Ok(LabelScore {
                    label: label.clone(),
                    score,
                })
            } else {
                Err(SubmitError::ScoreOutOfRange {
                    label: label.clone(),
                    score,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> Period {
        Period {
            from: "2024-06-01".parse().unwrap(),
            to: "2024-06-30".parse().unwrap(),
        }
    }

    fn labels() -> Vec<String> {
        vec!["집중력".to_string(), "창의력".to_string()]
    }

    fn scores(pairs: &[(&str, u8)]) -> HashMap<String, u8> {
        pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect()
    }

    #[test]
    fn accepts_both_period_bounds() {
        let full = scores(&[("집중력", 4), ("창의력", 5)]);
        for day in ["2024-06-01", "2024-06-30"] {
            let result = validate(day.parse().unwrap(), Some(&period()), &labels(), &full);
            assert!(result.is_ok(), "{day} should be accepted");
        }
    }

    #[test]
    fn rejects_one_day_outside_either_bound() {
        let full = scores(&[("집중력", 4), ("창의력", 5)]);
        for day in ["2024-05-31", "2024-07-01"] {
            let err = validate(day.parse().unwrap(), Some(&period()), &labels(), &full)
                .unwrap_err();
            assert!(matches!(
                err,
                SubmitError::OutOfPeriod { date, .. } if date.to_string() == day
            ));
            assert_eq!(
                err.to_string(),
                "날짜는 2024-06-01부터 2024-06-30 사이여야 합니다."
            );
        }
    }

    #[test]
    fn zero_score_is_incomplete() {
        let partial = scores(&[("집중력", 4), ("창의력", 0)]);
        let err = validate("2024-06-10".parse().unwrap(), Some(&period()), &labels(), &partial)
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Incomplete {
                missing: vec!["창의력".to_string()]
            }
        );
        assert_eq!(err.to_string(), messages::INCOMPLETE_SCORES);
    }

    #[test]
    fn output_follows_label_order() {
        let full = scores(&[("창의력", 5), ("집중력", 4)]);
        let ordered = validate("2024-06-10".parse().unwrap(), None, &labels(), &full).unwrap();
        assert_eq!(ordered[0].label, "집중력");
        assert_eq!(ordered[1].score, 5);
    }

    #[test]
    fn rejects_scores_above_scale() {
        let full = scores(&[("집중력", 6), ("창의력", 5)]);
        let err = validate("2024-06-10".parse().unwrap(), None, &labels(), &full).unwrap_err();
        assert!(matches!(err, SubmitError::ScoreOutOfRange { score: 6, .. }));
    }
}
