//! Configuration Loader
//!
//! Merges configuration sources, highest priority first:
//! 1. Environment variables (prefix `PITCHPIPE_`, separator `__`)
//! 2. Config files (`config.toml`, `config.local.toml`)
//! 3. Built-in defaults

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// Config file search names, without extension
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// Load the application configuration from the default sources.
///
/// # Environment variable examples
/// - `PITCHPIPE_SERVER__HOST=127.0.0.1`
/// - `PITCHPIPE_SERVER__PORT=8080`
/// - `PITCHPIPE_AUDIO__DEFAULT_RATE=48000`
/// - `PITCHPIPE_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// Load configuration, optionally from an explicit file.
///
/// When `config_path` is `None` the default search names are tried and
/// are allowed to be absent; an explicit path must exist.
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("audio.default_rate", 44_100)?
        .set_default("audio.default_duration_secs", 2.0)?
        .set_default("audio.amplitude", 0.8)?
        .set_default("log.level", "info")?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("PITCHPIPE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Reject configurations the server cannot start with.
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.audio.default_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Default sample rate cannot be 0".to_string(),
        ));
    }

    if !(config.audio.default_duration_secs > 0.0) {
        return Err(ConfigError::ValidationError(
            "Default duration must be positive".to_string(),
        ));
    }

    if !(config.audio.amplitude > 0.0 && config.audio.amplitude <= 1.0) {
        return Err(ConfigError::ValidationError(
            "Amplitude must be in (0, 1]".to_string(),
        ));
    }

    Ok(())
}

/// Log the effective configuration at startup.
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Default Sample Rate: {} Hz", config.audio.default_rate);
    tracing::info!(
        "Default Duration: {}s",
        config.audio.default_duration_secs
    );
    tracing::info!("Amplitude: {}", config.audio.amplitude);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
