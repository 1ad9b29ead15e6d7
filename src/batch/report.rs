//! Run summaries and pre-run checks.

use crate::batch::item::BatchItem;
use crate::batch::result::{BatchResult, ResultStatus};
use crate::privacy::IdentifierPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn from_results(total: usize, results: &[BatchResult]) -> Self {
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };
        for result in results {
            match result.status() {
                ResultStatus::Completed => summary.completed += 1,
                ResultStatus::Skipped => summary.skipped += 1,
                ResultStatus::Errored => summary.errored += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.errored > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} item(s): {} completed, {} skipped, {} errored",
            self.total, self.completed, self.skipped, self.errored
        )
    }
}

pub(crate) fn failure_samples(results: &[BatchResult], max_samples: usize) -> String {
    let errored: Vec<&BatchResult> = results
        .iter()
        .filter(|r| r.status() == ResultStatus::Errored)
        .collect();
    let mut messages: Vec<&str> = errored.iter().map(|r| r.content()).collect();
    messages.sort_unstable();
    messages.dedup();

    let samples: Vec<&str> = messages.into_iter().take(max_samples).collect();
    if samples.is_empty() {
        return String::new();
    }

    let mut out = format!("Sample errors: {}", samples.join(" | "));
    let remaining = errored.len().saturating_sub(samples.len());
    if remaining > 0 {
        out.push_str(&format!(" | ... and {} more", remaining));
    }
    out
}

/// What a run over these items would do, computed without generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightEntry {
    pub identifier: String,
    pub will_generate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_issue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    pub entries: Vec<PreflightEntry>,
}

impl PreflightReport {
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.will_generate).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.valid_count()
    }

    pub fn first_identifier_issue(&self) -> Option<(&str, &str)> {
        self.entries.iter().find_map(|e| {
            e.identifier_issue
                .as_deref()
                .map(|issue| (e.identifier.as_str(), issue))
        })
    }
}

pub fn preflight<P, V>(
    items: &[BatchItem<P>],
    is_valid: V,
    policy: IdentifierPolicy,
) -> PreflightReport
where
    V: Fn(&BatchItem<P>) -> bool,
{
    let entries = items
        .iter()
        .map(|item| PreflightEntry {
            identifier: item.identifier.clone(),
            will_generate: is_valid(item),
            identifier_issue: policy.check(&item.identifier).err(),
        })
        .collect();
    PreflightReport { entries }
}
