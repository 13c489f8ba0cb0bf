use crate::domain::color::{legend, Rgb};
use crate::domain::models::Questions;
use crate::domain::pivot::{ResultsRow, ResultsTable};

const RESET: &str = "\x1b[0m";
const BLACK_TEXT: &str = "\x1b[30m";

fn paint(text: &str, background: Rgb, ansi: bool) -> String {
    if ansi {
        format!("{}{} {} {}", background.ansi_background(), BLACK_TEXT, text, RESET)
    } else {
        format!(" {} ", text)
    }
}

fn header(table: &ResultsTable) -> String {
    let columns: String = table
        .labels
        .iter()
        .map(|label| format!("| {} ", label))
        .collect();
    format!("{:<12}{}| 성찰", "날짜", columns)
}

fn row_line(row: &ResultsRow, ansi: bool) -> String {
    let first = match &row.user_name {
        Some(name) => format!("{} {}", row.date, name),
        None => row.date.to_string(),
    };
    let cells: String = row
        .cells
        .iter()
        .map(|cell| format!("|{}", paint(&cell.display(), cell.color, ansi)))
        .collect();
    format!(
        "{:<12}{}| {}",
        first,
        cells,
        row.reflection_display().replace('\n', " ")
    )
}

/// Plain-text pivot: one line per row, cells coloured with 24-bit ANSI
/// backgrounds when `ansi` is set.
pub fn results_table(table: &ResultsTable, questions: &Questions, ansi: bool) -> String {
    let title = (!questions.question.is_empty()).then(|| questions.question.clone());
    title
        .into_iter()
        .chain(std::iter::once(header(table)))
        .chain(table.rows.iter().map(|row| row_line(row, ansi)))
        .map(|line| line + "\n")
        .collect()
}

pub fn legend_line(ansi: bool) -> String {
    legend()
        .iter()
        .map(|entry| format!("{} {}", paint("  ", entry.color, ansi), entry.caption))
        .collect::<Vec<_>>()
        .join("   ")
}
