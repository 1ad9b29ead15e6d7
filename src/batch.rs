//! Batch generation: items, per-item results, and the sequential runner.

pub mod item;
pub mod report;
pub mod result;
pub mod runner;

pub use item::{json_text_at_least, payload_text_len, BatchItem};
pub use report::{preflight, BatchSummary, PreflightEntry, PreflightReport};
pub use result::{error_content, BatchResult, BatchRun, ResultStatus, SKIPPED_PLACEHOLDER};
pub use runner::BatchRunner;
