//! Global config file source: the platform config dir, e.g.
//! `$XDG_CONFIG_HOME/classgen/config.toml`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "classgen").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Loading global configuration");
            Ok(builder.add_source(File::from(path.as_path()).required(false)))
        }
        _ => Ok(builder),
    }
}
