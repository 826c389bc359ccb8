use serde::Deserialize;
use serde_json::json;

use crate::{extractor::ListingRecord, pipeline::RunReport, store::KEYWORD_DELIMITER};

const HEADERS: [&str; 5] = ["Date", "Title", "Link", "Ministry", "Matched Keywords"];

/// Widest a column may grow before its cells are cut short.
const MAX_COLUMN_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

fn cells(record: &ListingRecord) -> [String; 5] {
    [
        record.date.clone(),
        record.title.clone(),
        record.link.clone(),
        record.ministry.clone(),
        record.matched_keywords.join(KEYWORD_DELIMITER),
    ]
}

fn fit(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    if len <= width {
        return format!("{cell:<width$}");
    }
    let cut: String = cell.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn render_line(row: &[String], widths: [usize; 5]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, width)| fit(cell, width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Renders records as a plain-text table with a header row.
pub fn render_table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let rows: Vec<[String; 5]> = records.into_iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count()).min(MAX_COLUMN_WIDTH);
        }
    }

    let header = HEADERS.map(String::from);
    let mut out = render_line(&header, widths);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        out.push_str(&render_line(row, widths));
        out.push('\n');
    }
    out
}

/// Machine-readable summary of a run: counters, save status and the new items.
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    let summary = json!({
        "finished_at": report.finished_at.to_rfc3339(),
        "pages": report.pages,
        "known_total": report.combined.len(),
        "saved": report.is_saved(),
        "save_error": report.save_error.as_ref().map(|e| e.to_string()),
        "new": report.new_ones,
    });
    serde_json::to_string_pretty(&summary)
}
