//! Configuration Module
//!
//! Layered configuration: environment variables over TOML config files
//! over built-in defaults.

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{AppConfig, AudioConfig, LogConfig, ServerConfig};
