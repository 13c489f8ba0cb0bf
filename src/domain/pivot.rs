use crate::domain::color::{cell_color, Rgb};
use crate::domain::models::{SurveyResponse, User};
use chrono::NaiveDate;
use serde::Serialize;

pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Serialize)]
pub struct ResultsTable {
    pub labels: Vec<String>,
    pub rows: Vec<ResultsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsRow {
    pub date: NaiveDate,
    pub user_id: String,
    /// Only filled for admin viewers, who see everyone's rows.
    pub user_name: Option<String>,
    pub cells: Vec<ResultsCell>,
    pub reflection: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsCell {
    pub score: Option<u8>,
    pub color: Rgb,
}

impl ResultsCell {
    pub fn display(&self) -> String {
        match self.score {
            Some(score) if score > 0 => score.to_string(),
            _ => PLACEHOLDER.to_string(),
        }
    }
}

impl ResultsRow {
    pub fn reflection_display(&self) -> &str {
        match self.reflection.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => PLACEHOLDER,
        }
    }
}

/// Column set for a viewer. Admins also get labels that only appear in other
/// users' responses, appended in first-seen order.
pub fn columns_for(viewer: &User, responses: &[SurveyResponse]) -> Vec<String> {
    let mut labels = viewer.label_list();
    if viewer.role.is_admin() {
        for response in responses {
            for score in &response.scores {
                if !labels.contains(&score.label) {
                    labels.push(score.label.clone());
                }
            }
        }
    }
    labels
}

/// Pivots responses into date rows by label columns. Rows follow date order,
/// ties broken by user id.
pub fn build_table(viewer: &User, responses: &[SurveyResponse]) -> ResultsTable {
    let labels = columns_for(viewer, responses);
    let show_names = viewer.role.is_admin();

    let mut sorted: Vec<&SurveyResponse> = responses.iter().collect();
    sorted.sort_by_key(|response| response.key());

    let rows = sorted
        .into_iter()
        .map(|response| ResultsRow {
            date: response.date,
            user_id: response.user_id.clone(),
            user_name: show_names.then(|| display_name(response)),
            cells: labels
                .iter()
                .map(|label| {
                    let score = response.score_for(label);
                    ResultsCell {
                        score,
                        color: cell_color(score),
                    }
                })
                .collect(),
            reflection: response.reflection.clone(),
        })
        .collect();

    ResultsTable { labels, rows }
}

fn display_name(response: &SurveyResponse) -> String {
    if response.user_name.is_empty() {
        response.user_id.clone()
    } else {
        response.user_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::score_color;
    use crate::domain::models::{LabelScore, ResponseEntry, ResponseKey, UserRole};
    use chrono::Utc;

    fn viewer(role: UserRole, labels: &str) -> User {
        User {
            id: "viewer".into(),
            name: "뷰어".into(),
            labels: labels.into(),
            role,
        }
    }

    fn response(user: &str, date: &str, scores: &[(&str, u8)]) -> SurveyResponse {
        let now = Utc::now();
        SurveyResponse::from_parts(
            ResponseKey::new(user, date.parse().unwrap()),
            ResponseEntry {
                user_name: format!("{user}-name"),
                scores: scores
                    .iter()
                    .map(|(label, score)| LabelScore {
                        label: label.to_string(),
                        score: *score,
                    })
                    .collect(),
                reflection: None,
                timestamp: now,
            },
            now,
            now,
        )
    }

    #[test]
    fn rows_are_sorted_by_date_and_missing_cells_are_placeholders() {
        let user = viewer(UserRole::User, "집중력 창의력");
        let responses = vec![
            response("viewer", "2024-06-02", &[("집중력", 2)]),
            response("viewer", "2024-06-01", &[("집중력", 4), ("창의력", 5)]),
        ];

        let table = build_table(&user, &responses);
        assert_eq!(table.labels, vec!["집중력", "창의력"]);
        assert_eq!(table.rows[0].date.to_string(), "2024-06-01");
        assert_eq!(table.rows[0].cells[1].display(), "5");
        assert_eq!(table.rows[0].cells[1].color, score_color(5));
        assert_eq!(table.rows[1].cells[1].display(), PLACEHOLDER);
        assert_eq!(table.rows[1].cells[1].color, Rgb::WHITE);
        assert!(table.rows[0].user_name.is_none());
        assert_eq!(table.rows[0].reflection_display(), PLACEHOLDER);
    }

    #[test]
    fn admin_sees_names_and_foreign_labels() {
        let admin = viewer(UserRole::Admin, "리더십");
        let responses = vec![
            response("user1", "2024-06-01", &[("집중력", 4)]),
            response("user2", "2024-06-01", &[("리더십", 3), ("공감", 1)]),
        ];

        let table = build_table(&admin, &responses);
        assert_eq!(table.labels, vec!["리더십", "집중력", "공감"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].user_name.as_deref(), Some("user1-name"));
        assert_eq!(table.rows[1].cells[2].display(), "1");
    }
}
