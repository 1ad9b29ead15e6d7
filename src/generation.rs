//! Generation service contract.
//!
//! The runner treats the backend as opaque: a task-specific JSON request goes
//! in, `{ "content": ... }` or `{ "error": ... }` comes back. Request shape and
//! prompt wording belong to the caller.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod http;

pub use http::HttpGenerationService;

/// Wire response of the generation backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            error: None,
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            content: None,
            error: Some(error.into()),
        }
    }

    /// Resolve to the generated text. A non-empty `error` wins over `content`.
    pub fn into_content(self) -> Result<String, GenerationError> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(GenerationError::Service(error));
        }
        self.content.ok_or_else(|| {
            GenerationError::InvalidResponse("response has neither content nor error".to_string())
        })
    }
}

/// Text generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Send one request. Transport and HTTP failures are `Err`; an error
    /// reported by the service itself may arrive as `Ok` with `error` set.
    async fn generate(&self, request: Value) -> Result<GenerationResponse, GenerationError>;

    /// Name used in logs.
    fn service_name(&self) -> &str;
}
