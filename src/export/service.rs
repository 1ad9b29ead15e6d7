//! Export service contract and HTTP client.
//!
//! Format conversion (.docx, .xlsx) is the service's job; this side only sends
//! the assembled text and receives bytes.

use crate::batch::BatchRun;
use crate::error::ExportError;
use crate::export::assembler::{assemble, ExportHeader};
use crate::http::{attachment_file_name, body_excerpt, build_http_client, HttpTimeouts};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub title: String,
    pub content: String,
    pub tool_name: String,
}

/// Rendered document as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export(&self, request: &ExportRequest) -> Result<ExportDocument, ExportError>;
}

/// Assemble `run` under `header` and hand it to the export service.
///
/// The run is only borrowed: a failed export leaves every result as it was,
/// and the caller can retry.
pub async fn export_run<P, S>(
    service: &S,
    run: &BatchRun<P>,
    header: &ExportHeader,
) -> Result<ExportDocument, ExportError>
where
    S: ExportService + ?Sized,
{
    let completed = run.summary().completed;
    if completed == 0 {
        return Err(ExportError::NothingToExport);
    }
    let request = ExportRequest {
        title: header.title.clone(),
        content: assemble(run, &header.render()),
        tool_name: header.tool_name.clone(),
    };
    match service.export(&request).await {
        Ok(document) => {
            info!(
                run_id = %run.run_id(),
                sections = completed,
                bytes = document.bytes.len(),
                "Export completed"
            );
            Ok(document)
        }
        Err(err) => {
            warn!(
                run_id = %run.run_id(),
                error = %err,
                retryable = err.is_retryable(),
                "Export failed"
            );
            Err(err)
        }
    }
}

pub struct HttpExportService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpExportService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ExportError> {
        let client = build_http_client(timeouts)
            .map_err(|e| ExportError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[derive(Deserialize)]
struct ExportErrorBody {
    error: Option<String>,
}

fn map_transport_error(error: reqwest::Error) -> ExportError {
    if error.is_timeout() {
        ExportError::Timeout(error.to_string())
    } else {
        ExportError::Transport(error.to_string())
    }
}

#[async_trait]
impl ExportService for HttpExportService {
    async fn export(&self, request: &ExportRequest) -> Result<ExportDocument, ExportError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ExportErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| body_excerpt(&body));
            return Err(ExportError::Failed(format!("status {}: {}", status, message)));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if bytes.is_empty() {
            return Err(ExportError::InvalidResponse(
                "service returned an empty document".to_string(),
            ));
        }
        Ok(ExportDocument {
            bytes: bytes.to_vec(),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            file_name: attachment_file_name(&headers),
        })
    }
}
