//! File-to-text extraction used to fill item payloads before a run.
//!
//! Plain-text formats are decoded locally. Anything else (.docx, .pdf, ...)
//! goes to the extraction service when one is configured.

use crate::error::ExtractError;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

pub mod http;

pub use http::HttpTextExtractor;

/// Extensions decoded locally as UTF-8 text.
pub const LOCAL_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown", "csv", "tsv", "json"];

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Lower-cased extension of `file_name`, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Read `path` and extract its text with `extractor`.
pub async fn extract_file<E>(extractor: &E, path: &Path) -> Result<String, ExtractError>
where
    E: TextExtractor + ?Sized,
{
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    debug!(file = %file_name, bytes = bytes.len(), "Extracting text");
    extractor.extract(&file_name, &bytes).await
}

/// UTF-8 decoding for plain-text formats: strips a BOM, normalizes line
/// endings, trims.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTextExtractor;

impl LocalTextExtractor {
    pub fn supports(&self, file_name: &str) -> bool {
        file_extension(file_name)
            .map(|ext| LOCAL_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractError::InvalidEncoding(format!("{}: {}", file_name, e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let text = text.replace("\r\n", "\n");
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractError::Empty(file_name.to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TextExtractor for LocalTextExtractor {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        if !self.supports(file_name) {
            return Err(ExtractError::UnsupportedFormat(
                file_extension(file_name).unwrap_or_else(|| file_name.to_string()),
            ));
        }
        self.decode(file_name, bytes)
    }
}

/// Local extraction first, the remote service for formats it cannot read.
pub struct ExtractorChain {
    local: LocalTextExtractor,
    remote: Option<Box<dyn TextExtractor>>,
}

impl ExtractorChain {
    pub fn new(remote: Option<Box<dyn TextExtractor>>) -> Self {
        Self {
            local: LocalTextExtractor,
            remote,
        }
    }
}

#[async_trait]
impl TextExtractor for ExtractorChain {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        match self.local.extract(file_name, bytes).await {
            Err(ExtractError::UnsupportedFormat(ext)) => match &self.remote {
                Some(remote) => {
                    debug!(file = %file_name, extension = %ext, "Delegating extraction to service");
                    remote.extract(file_name, bytes).await
                }
                None => Err(ExtractError::UnsupportedFormat(ext)),
            },
            other => other,
        }
    }
}
