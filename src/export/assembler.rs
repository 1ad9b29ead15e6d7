//! Combined plain-text document for a finished run.
//!
//! Only completed results are exported. Skipped and errored items stay visible
//! in the review list but never reach the downloadable document.

use crate::batch::BatchRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SECTION_SEPARATOR: &str = "========================================";

/// Metadata block placed above the exported sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHeader {
    pub title: String,
    pub tool_name: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub settings: Vec<(String, String)>,
}

impl ExportHeader {
    pub fn new(title: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tool_name: tool_name.into(),
            generated_at: Utc::now(),
            settings: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.push((key.into(), value.into()));
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\nTool: {}\nGenerated: {}",
            self.title,
            self.tool_name,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        for (key, value) in &self.settings {
            out.push_str(&format!("\n{}: {}", key, value));
        }
        out
    }
}

/// `header`, then one labelled section per completed result, in item order.
/// Section text is the user's edit when present.
pub fn assemble<P>(run: &BatchRun<P>, header: &str) -> String {
    let mut out = String::new();
    if !header.is_empty() {
        out.push_str(header);
        out.push_str("\n\n");
    }
    for result in run.completed() {
        out.push_str(&format!("--- {} ---\n", result.identifier()));
        out.push_str(result.export_text());
        out.push_str("\n\n");
        out.push_str(SECTION_SEPARATOR);
        out.push_str("\n\n");
    }
    out
}
