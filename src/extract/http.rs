//! HTTP client for the server-side extraction service (multipart upload).

use crate::error::ExtractError;
use crate::extract::TextExtractor;
use crate::http::{body_excerpt, build_http_client, HttpTimeouts};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpTextExtractor {
    client: Client,
    endpoint: String,
}

impl HttpTextExtractor {
    pub fn new(endpoint: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, ExtractError> {
        let client = build_http_client(timeouts).map_err(|e| {
            ExtractError::Transport(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        let parsed = serde_json::from_str::<ExtractionResponse>(&body).ok();
        if let Some(error) = parsed
            .as_ref()
            .and_then(|r| r.error.clone())
            .filter(|e| !e.trim().is_empty())
        {
            return Err(ExtractError::Service(error));
        }
        if !status.is_success() {
            return Err(ExtractError::Service(format!(
                "status {}: {}",
                status,
                body_excerpt(&body)
            )));
        }
        let text = parsed
            .and_then(|r| r.text)
            .ok_or_else(|| ExtractError::Service(format!("unexpected response: {}", body_excerpt(&body))))?;
        if text.trim().is_empty() {
            return Err(ExtractError::Empty(file_name.to_string()));
        }
        Ok(text.trim().to_string())
    }
}
