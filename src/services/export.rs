//! CSV export of per-chapter analytics rows.

use crate::services::analytics::ChapterStats;

pub const CSV_HEADER: &str = "tome,chapitre,position,mots";

/// Quote a CSV field, doubling embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render rows as CSV in their given order. String columns are always
/// quoted; position and word count are bare numbers, with a missing
/// position left empty.
pub fn rows_to_csv(rows: &[ChapterStats]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in rows {
        let position = row.position.map(|p| p.to_string()).unwrap_or_default();
        lines.push(format!(
            "{},{},{},{}",
            quote(&row.tome_name),
            quote(&row.chapter_title),
            position,
            row.word_count
        ));
    }
    lines.join("\n")
}
