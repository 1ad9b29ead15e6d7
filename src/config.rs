//! Configuration System
//!
//! Layered configuration for the service endpoints, batch defaults and
//! logging. Sources, lowest precedence first: built-in defaults, the global
//! config file, workspace `config/config.toml`, workspace
//! `config/{CLASSGEN_ENV}.toml`, then `CLASSGEN__*` environment variables.

use crate::error::ApiError;
use crate::http::HttpTimeouts;
use crate::logging::LoggingConfig;
use crate::privacy::IdentifierPolicy;
use config::Environment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassgenConfig {
    #[serde(default)]
    pub generation: GenerationServiceConfig,

    #[serde(default)]
    pub export: ExportServiceConfig,

    #[serde(default)]
    pub extraction: ExtractionServiceConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_generation_timeout")]
    pub request_timeout_secs: u64,
}

/// Export (document conversion) service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Tool name sent with export requests when the caller gives none
    #[serde(default = "default_tool_name")]
    pub tool_name: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_service_timeout")]
    pub request_timeout_secs: u64,
}

/// Server-side text extraction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_service_timeout")]
    pub request_timeout_secs: u64,
}

/// Batch defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Minimum trimmed payload text length for an item to be generated
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Payload field holding the item text; all top-level strings when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_field: Option<String>,

    /// Reject name-shaped identifiers before a run
    #[serde(default)]
    pub strict_identifiers: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_service_timeout() -> u64 {
    60
}

fn default_tool_name() -> String {
    "classgen".to_string()
}

fn default_min_content_length() -> usize {
    50
}

impl Default for GenerationServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_generation_timeout(),
        }
    }
}

impl Default for ExportServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            tool_name: default_tool_name(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_service_timeout(),
        }
    }
}

impl Default for ExtractionServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_service_timeout(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            content_field: None,
            strict_identifiers: false,
        }
    }
}

impl GenerationServiceConfig {
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.request_timeout_secs)
    }
}

impl ExportServiceConfig {
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.request_timeout_secs)
    }
}

impl ExtractionServiceConfig {
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.request_timeout_secs)
    }
}

impl BatchConfig {
    pub fn identifier_policy(&self) -> IdentifierPolicy {
        IdentifierPolicy::from_strict(self.strict_identifiers)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Generation(String),
    Export(String),
    Extraction(String),
    Batch(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Export(msg) => write!(f, "export: {}", msg),
            ValidationError::Extraction(msg) => write!(f, "extraction: {}", msg),
            ValidationError::Batch(msg) => write!(f, "batch: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn check_endpoint(endpoint: Option<&str>) -> Result<(), String> {
    match endpoint {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(format!(
            "Invalid endpoint '{}': must start with http:// or https://",
            url
        )),
        _ => Ok(()),
    }
}

fn check_timeouts(connect: u64, request: u64) -> Result<(), String> {
    if connect == 0 || request == 0 {
        return Err("Timeouts must be greater than zero".to_string());
    }
    Ok(())
}

impl ClassgenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let generation = &self.generation;
        if let Err(e) = check_endpoint(generation.endpoint.as_deref()) {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) =
            check_timeouts(generation.connect_timeout_secs, generation.request_timeout_secs)
        {
            errors.push(ValidationError::Generation(e));
        }

        let export = &self.export;
        if let Err(e) = check_endpoint(export.endpoint.as_deref()) {
            errors.push(ValidationError::Export(e));
        }
        if let Err(e) = check_timeouts(export.connect_timeout_secs, export.request_timeout_secs) {
            errors.push(ValidationError::Export(e));
        }
        if export.tool_name.trim().is_empty() {
            errors.push(ValidationError::Export("Tool name cannot be empty".to_string()));
        }

        let extraction = &self.extraction;
        if let Err(e) = check_endpoint(extraction.endpoint.as_deref()) {
            errors.push(ValidationError::Extraction(e));
        }
        if let Err(e) =
            check_timeouts(extraction.connect_timeout_secs, extraction.request_timeout_secs)
        {
            errors.push(ValidationError::Extraction(e));
        }

        if let Some(field) = &self.batch.content_field {
            if field.trim().is_empty() {
                errors.push(ValidationError::Batch(
                    "content_field cannot be empty when set".to_string(),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all errors into one `ApiError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}

/// Loads `ClassgenConfig` from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load all layers for `workspace_root`.
    pub fn load(workspace_root: &Path) -> Result<ClassgenConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(env_source());

        let config: ClassgenConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single file on top of the defaults, still honoring environment
    /// overrides.
    pub fn load_from_file(path: &Path) -> Result<ClassgenConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: ClassgenConfig = merge::builder_with_defaults()?
            .add_source(config::File::from(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CLASSGEN")
        .separator("__")
        .try_parsing(true)
}
