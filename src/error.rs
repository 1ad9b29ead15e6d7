//! Error types for the classgen batch generation pipeline.

use thiserror::Error;

/// Run-level errors. Only these abort a run, and all of them fire before the
/// first generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("No valid input: no item has enough content to generate from")]
    NoValidInput,

    #[error("A batch run is already in progress on this runner")]
    RunInProgress,

    #[error("Identifier '{identifier}' rejected: {reason}")]
    IdentifierRejected { identifier: String, reason: String },

    #[error("Result index {index} out of range (run has {len} results)")]
    ResultIndexOutOfRange { index: usize, len: usize },
}

/// Failure of a single item's generation call. Recorded on the item, never
/// propagated past the runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service answered with an `{ "error": ... }` payload.
    #[error("{0}")]
    Service(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation panicked: {0}")]
    Panicked(String),
}

impl GenerationError {
    /// Network-level failures (the transport subtype of item errors).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GenerationError::Timeout(_) | GenerationError::Transport(_)
        )
    }
}

/// Post-run export failures. Collected results are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    Failed(String),

    #[error("Export transport error: {0}")]
    Transport(String),

    #[error("Export timeout: {0}")]
    Timeout(String),

    #[error("Invalid export response: {0}")]
    InvalidResponse(String),

    #[error("Nothing to export: the run has no completed results")]
    NothingToExport,
}

impl ExportError {
    /// Whether offering the user a retry makes sense.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExportError::NothingToExport)
    }
}

/// File-to-text extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File is not valid UTF-8 text: {0}")]
    InvalidEncoding(String),

    #[error("No text could be extracted from {0}")]
    Empty(String),

    #[error("Extraction service error: {0}")]
    Service(String),

    #[error("Extraction transport error: {0}")]
    Transport(String),

    #[error("Extraction I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for the CLI and configuration layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
