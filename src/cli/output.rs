//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, BatchError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Batch(BatchError::NoValidInput) => format!(
            "{}\nhint: every item is below the minimum content length; lower --min-length or fill the payloads",
            e
        ),
        ApiError::Batch(BatchError::IdentifierRejected { .. }) => format!(
            "{}\nhint: use generic labels such as \"Student 1\" instead of names",
            e
        ),
        ApiError::Export(err) if err.is_retryable() => {
            format!("{}\nhint: the run is unchanged; retry with `classgen assemble`", e)
        }
        _ => e.to_string(),
    }
}
