//! Merge rules: defaults, override order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with every section's defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.connect_timeout_secs", 10)?
        .set_default("generation.request_timeout_secs", 120)?
        .set_default("export.tool_name", "classgen")?
        .set_default("export.connect_timeout_secs", 10)?
        .set_default("export.request_timeout_secs", 60)?
        .set_default("extraction.connect_timeout_secs", 10)?
        .set_default("extraction.request_timeout_secs", 60)?
        .set_default("batch.min_content_length", 50)?
        .set_default("batch.strict_identifiers", false)
}
