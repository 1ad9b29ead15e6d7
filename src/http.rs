//! Shared HTTP client construction for the external services.

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest slice of an unparseable error body quoted back in messages.
const MAX_BODY_EXCERPT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl HttpTimeouts {
    pub fn from_secs(connect_secs: u64, request_secs: u64) -> Self {
        Self {
            connect: Duration::from_secs(connect_secs),
            request: Duration::from_secs(request_secs),
        }
    }
}

pub fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
}

/// First characters of a response body, for error messages.
pub fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_EXCERPT {
        return trimmed.to_string();
    }
    let mut excerpt: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    excerpt.push_str("...");
    excerpt
}

/// `filename` from a Content-Disposition header, quoted or bare.
pub fn attachment_file_name(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    value.split(';').map(str::trim).find_map(|part| {
        let name = part.strip_prefix("filename=")?;
        let name = name.trim_matches('"').trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}
