//! Event schema for batch run progress.

use crate::batch::report::BatchSummary;
use serde::{Deserialize, Serialize};

/// Lifecycle events emitted by the runner, in order. `position` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        total: usize,
    },
    /// Emitted before the item's work begins: "3 of 10" means item 3 is in flight.
    ItemStarted {
        run_id: String,
        position: usize,
        total: usize,
        identifier: String,
    },
    ItemCompleted {
        run_id: String,
        position: usize,
        identifier: String,
    },
    ItemSkipped {
        run_id: String,
        position: usize,
        identifier: String,
    },
    ItemErrored {
        run_id: String,
        position: usize,
        identifier: String,
        error: String,
    },
    RunCompleted {
        run_id: String,
        summary: BatchSummary,
    },
}

impl RunEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "run_started",
            RunEvent::ItemStarted { .. } => "item_started",
            RunEvent::ItemCompleted { .. } => "item_completed",
            RunEvent::ItemSkipped { .. } => "item_skipped",
            RunEvent::ItemErrored { .. } => "item_errored",
            RunEvent::RunCompleted { .. } => "run_completed",
        }
    }

    pub fn run_id(&self) -> &str {
        match self {
            RunEvent::RunStarted { run_id, .. }
            | RunEvent::ItemStarted { run_id, .. }
            | RunEvent::ItemCompleted { run_id, .. }
            | RunEvent::ItemSkipped { run_id, .. }
            | RunEvent::ItemErrored { run_id, .. }
            | RunEvent::RunCompleted { run_id, .. } => run_id,
        }
    }
}

/// Live position of the runner. `(0, 0)` when idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub cursor: usize,
    pub total: usize,
}

impl RunProgress {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.total == 0
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.cursor * 100) / self.total).min(100) as u8
    }
}

/// Timestamped event as delivered over the progress bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEnvelope {
    pub ts: u64,
    pub seq: u64,
    pub event: RunEvent,
}
