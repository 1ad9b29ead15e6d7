//! Per-item outcomes and the run value that owns them.

use crate::batch::item::BatchItem;
use crate::batch::report::{failure_samples, BatchSummary};
use crate::error::{BatchError, GenerationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content recorded for items that did not have enough input to generate from.
pub const SKIPPED_PLACEHOLDER: &str = "[Skipped: not enough content to generate]";

/// Content recorded for an item whose generation call failed.
pub fn error_content(message: &str) -> String {
    format!("[Error generating: {}]", message)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    Skipped,
    Errored,
}

impl ResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Completed => "completed",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Errored => "errored",
        }
    }
}

/// Outcome of one item. `content` is fixed at creation; only `edited_content`
/// changes afterwards, and only through explicit edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    identifier: String,
    status: ResultStatus,
    content: String,
    edited_content: String,
}

impl BatchResult {
    fn new(identifier: String, status: ResultStatus, content: String) -> Self {
        Self {
            identifier,
            status,
            edited_content: content.clone(),
            content,
        }
    }

    pub fn completed(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(identifier.into(), ResultStatus::Completed, text.into())
    }

    pub fn skipped(identifier: impl Into<String>) -> Self {
        Self::new(
            identifier.into(),
            ResultStatus::Skipped,
            SKIPPED_PLACEHOLDER.to_string(),
        )
    }

    pub fn errored(identifier: impl Into<String>, error: &GenerationError) -> Self {
        Self::new(
            identifier.into(),
            ResultStatus::Errored,
            error_content(&error.to_string()),
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn edited_content(&self) -> &str {
        &self.edited_content
    }

    pub fn is_edited(&self) -> bool {
        self.edited_content != self.content
    }

    /// Text used for export and copy: the edit, or the original when the edit
    /// was cleared.
    pub fn export_text(&self) -> &str {
        if self.edited_content.is_empty() {
            &self.content
        } else {
            &self.edited_content
        }
    }

    pub fn set_edited_content(&mut self, text: impl Into<String>) {
        self.edited_content = text.into();
    }
}

/// One invocation's items and results, index-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun<P> {
    run_id: String,
    items: Vec<BatchItem<P>>,
    results: Vec<BatchResult>,
    cursor: usize,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl<P> BatchRun<P> {
    pub(crate) fn start(run_id: String, items: Vec<BatchItem<P>>) -> Self {
        let capacity = items.len();
        Self {
            run_id,
            items,
            results: Vec::with_capacity(capacity),
            cursor: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Move the cursor onto the next item and return its 1-based position.
    pub(crate) fn advance(&mut self) -> usize {
        self.cursor += 1;
        self.cursor
    }

    pub(crate) fn push(&mut self, result: BatchResult) {
        debug_assert!(self.results.len() < self.items.len());
        self.results.push(result);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn items(&self) -> &[BatchItem<P>] {
        &self.items
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn result(&self, index: usize) -> Option<&BatchResult> {
        self.results.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() == self.items.len() && self.finished_at.is_some()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Completed results in item order.
    pub fn completed(&self) -> impl Iterator<Item = &BatchResult> {
        self.results
            .iter()
            .filter(|r| r.status() == ResultStatus::Completed)
    }

    /// Replace the user-edited text of result `index`.
    pub fn edit(&mut self, index: usize, text: impl Into<String>) -> Result<(), BatchError> {
        let len = self.results.len();
        let result = self
            .results
            .get_mut(index)
            .ok_or(BatchError::ResultIndexOutOfRange { index, len })?;
        result.set_edited_content(text);
        Ok(())
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(self.items.len(), &self.results)
    }

    /// Deduplicated sample of error messages, for one-line reporting.
    pub fn failure_samples(&self, max_samples: usize) -> String {
        failure_samples(&self.results, max_samples)
    }

    /// Check a finished run read back from outside the runner: one result per
    /// item, labelled alike at each index, with the cursor past the last item.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.results.len() != self.items.len() {
            return Err(format!(
                "{} item(s) but {} result(s)",
                self.items.len(),
                self.results.len()
            ));
        }
        if let Some((index, (item, result))) = self
            .items
            .iter()
            .zip(&self.results)
            .enumerate()
            .find(|(_, (item, result))| item.identifier != result.identifier)
        {
            return Err(format!(
                "result {} is labelled '{}' but its item is '{}'",
                index, result.identifier, item.identifier
            ));
        }
        if self.cursor != self.items.len() {
            return Err(format!(
                "cursor is {} but the run has {} item(s)",
                self.cursor,
                self.items.len()
            ));
        }
        Ok(())
    }
}
