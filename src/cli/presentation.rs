//! CLI presentation: text and json formatters for run reviews and dry runs.

use crate::batch::{BatchRun, PreflightReport, ResultStatus};
use crate::error::ApiError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

const PREVIEW_CHARS: usize = 60;

/// Section heading: bold and underlined.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// First line of `text`, cut to `max` characters.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn status_label(status: ResultStatus) -> String {
    match status {
        ResultStatus::Completed => format!("{}", "completed".green()),
        ResultStatus::Skipped => format!("{}", "skipped".yellow()),
        ResultStatus::Errored => format!("{}", "errored".red()),
    }
}

/// Review table for a finished run, one row per item in input order.
pub fn format_run_review_text<P>(run: &BatchRun<P>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Review")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Identifier", "Status", "Content"]);
    for (index, result) in run.results().iter().enumerate() {
        let edited = if result.is_edited() { " (edited)" } else { "" };
        table.add_row(vec![
            (index + 1).to_string(),
            result.identifier().to_string(),
            format!("{}{}", status_label(result.status()), edited),
            preview(result.export_text(), PREVIEW_CHARS),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    let summary = run.summary();
    out.push_str(&format!("{}\n", summary));
    if summary.has_errors() {
        out.push_str(&format!("{}\n", run.failure_samples(3)));
    }
    out
}

#[derive(Serialize)]
struct ResultRow<'a> {
    identifier: &'a str,
    status: ResultStatus,
    content: &'a str,
    edited: bool,
}

/// JSON view of a finished run.
pub fn format_run_json<P>(run: &BatchRun<P>) -> Result<String, ApiError> {
    let rows: Vec<ResultRow<'_>> = run
        .results()
        .iter()
        .map(|r| ResultRow {
            identifier: r.identifier(),
            status: r.status(),
            content: r.export_text(),
            edited: r.is_edited(),
        })
        .collect();
    let out = json!({
        "run_id": run.run_id(),
        "summary": run.summary(),
        "results": rows,
    });
    serde_json::to_string_pretty(&out).map_err(|e| ApiError::InvalidInput(e.to_string()))
}

/// Dry-run table: which items generate, which skip, and identifier issues.
pub fn format_preflight_text(report: &PreflightReport, min_length: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Batch check")));
    if report.entries.is_empty() {
        out.push_str("No items in input.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Identifier", "Action", "Identifier issue"]);
    for (index, entry) in report.entries.iter().enumerate() {
        let action = if entry.will_generate {
            format!("{}", "generate".green())
        } else {
            format!("{}", "skip".yellow())
        };
        table.add_row(vec![
            (index + 1).to_string(),
            entry.identifier.clone(),
            action,
            entry.identifier_issue.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!(
        "{} of {} item(s) will be generated (minimum {} characters), {} skipped\n",
        report.valid_count(),
        report.entries.len(),
        min_length,
        report.skipped_count()
    ));
    if report.valid_count() == 0 {
        out.push_str("A run would fail: no item has enough content.\n");
    }
    out
}

pub fn format_preflight_json(report: &PreflightReport) -> Result<String, ApiError> {
    let out = json!({
        "items": report.entries,
        "valid": report.valid_count(),
        "skipped": report.skipped_count(),
    });
    serde_json::to_string_pretty(&out).map_err(|e| ApiError::InvalidInput(e.to_string()))
}
