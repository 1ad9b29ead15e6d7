//! Integration tests for Configuration System

use classgen::config::{ClassgenConfig, ConfigLoader};
use classgen::error::ApiError;
use classgen::privacy::IdentifierPolicy;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that set CLASSGEN_* environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_workspace_config(root: &Path, name: &str, body: &str) {
    let dir = root.join("config");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_workspace_config_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        "config.toml",
        r#"
[generation]
endpoint = "https://gen.example.com/v1/generate"
api_key = "k-123"

[export]
endpoint = "https://export.example.com/docx"

[batch]
min_content_length = 80
"#,
    );

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(
        config.generation.endpoint.as_deref(),
        Some("https://gen.example.com/v1/generate")
    );
    assert_eq!(config.generation.api_key.as_deref(), Some("k-123"));
    assert_eq!(config.batch.min_content_length, 80);
    assert_eq!(config.generation.request_timeout_secs, 120);
    assert!(config.extraction.endpoint.is_none());
}

#[test]
fn test_environment_file_overrides_base_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        "config.toml",
        "[batch]\nmin_content_length = 80\nstrict_identifiers = false\n",
    );
    write_workspace_config(
        temp_dir.path(),
        "staging.toml",
        "[batch]\nstrict_identifiers = true\n",
    );

    std::env::set_var("CLASSGEN_ENV", "staging");
    let config = ConfigLoader::load(temp_dir.path());
    std::env::remove_var("CLASSGEN_ENV");

    let config = config.unwrap();
    assert_eq!(config.batch.min_content_length, 80);
    assert_eq!(config.batch.identifier_policy(), IdentifierPolicy::Strict);
}

#[test]
fn test_environment_variables_override_files() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        "config.toml",
        "[export]\ntool_name = \"from-file\"\n",
    );

    std::env::set_var("CLASSGEN__EXPORT__TOOL_NAME", "from-env");
    let config = ConfigLoader::load(temp_dir.path());
    std::env::remove_var("CLASSGEN__EXPORT__TOOL_NAME");

    assert_eq!(config.unwrap().export.tool_name, "from-env");
}

#[test]
fn test_missing_workspace_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    let defaults = ClassgenConfig::default();
    assert_eq!(
        config.batch.min_content_length,
        defaults.batch.min_content_length
    );
    assert_eq!(
        config.export.connect_timeout_secs,
        defaults.export.connect_timeout_secs
    );
}

#[test]
fn test_validation_rejects_bad_endpoints_and_timeouts() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_file,
        r#"
[generation]
endpoint = "gen.example.com"
connect_timeout_secs = 0

[export]
endpoint = "ftp://export.example.com"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages.len(), 3, "{:?}", messages);
    assert!(messages[0].contains("gen.example.com"));
    assert!(messages[1].contains("greater than zero"));
    assert!(messages[2].starts_with("export:"));
    assert!(matches!(
        config.ensure_valid(),
        Err(ApiError::ConfigError(_))
    ));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("broken.toml");
    std::fs::write(&config_file, "[batch\nmin_content_length = ").unwrap();

    let result = ConfigLoader::load_from_file(&config_file);
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}
