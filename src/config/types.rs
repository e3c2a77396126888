//! Configuration Types

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Synthesis defaults
    #[serde(default)]
    pub audio: AudioConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL advertised by the index endpoint.
    /// Defaults to `http://{host}:{port}` when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// Bind address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL clients should use to reach this server
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// Synthesis defaults, used when a request omits the parameter
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Default sample rate (Hz)
    #[serde(default = "default_rate")]
    pub default_rate: u32,

    /// Default clip duration (seconds)
    #[serde(default = "default_duration")]
    pub default_duration_secs: f64,

    /// Waveform amplitude relative to full scale, in (0, 1]
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}

fn default_rate() -> u32 {
    44_100
}

fn default_duration() -> f64 {
    2.0
}

fn default_amplitude() -> f32 {
    0.8
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_rate: default_rate(),
            default_duration_secs: default_duration(),
            amplitude: default_amplitude(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level filter
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
