//! HTTP client for the generation backend (JSON POST per item).

use crate::error::GenerationError;
use crate::generation::{GenerationResponse, GenerationService};
use crate::http::{body_excerpt, build_http_client, HttpTimeouts};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

pub struct HttpGenerationService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, GenerationError> {
        let client = build_http_client(timeouts).map_err(|e| {
            GenerationError::Transport(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout(error.to_string())
    } else if error.is_connect() {
        GenerationError::Transport(format!("Connection error: {}", error))
    } else if error.is_decode() {
        GenerationError::InvalidResponse(error.to_string())
    } else {
        GenerationError::Transport(format!("HTTP error: {}", error))
    }
}

fn map_status(status: StatusCode, message: String) -> GenerationError {
    match status.as_u16() {
        401 | 403 => GenerationError::AuthFailed(message),
        429 => GenerationError::RateLimited(message),
        _ => GenerationError::RequestFailed(format!("status {}: {}", status, message)),
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: Value) -> Result<GenerationResponse, GenerationError> {
        let started = Instant::now();
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Generation request finished"
        );

        if !status.is_success() {
            let message = serde_json::from_str::<GenerationResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| body_excerpt(&body));
            return Err(map_status(status, message));
        }

        serde_json::from_str(&body)
            .map_err(|e| GenerationError::InvalidResponse(format!("{}: {}", e, body_excerpt(&body))))
    }

    fn service_name(&self) -> &str {
        "http"
    }
}
