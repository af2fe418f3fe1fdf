//! Configuration types for game-link

use crate::telemetry::LogFormat;
use crate::ws::{ClientConfig, DEFAULT_HTTP_BASE_URL, DEFAULT_WS_URL};
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Backend server connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// WebSocket endpoint
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// HTTP endpoint sharing the WebSocket host
    #[serde(default = "default_http_base_url")]
    pub http_base_url: String,

    /// Delay before reconnecting after a close (milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Reconnect automatically after a close
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}
fn default_http_base_url() -> String {
    DEFAULT_HTTP_BASE_URL.to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    3000
}
fn default_true() -> bool {
    true
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            http_base_url: default_http_base_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            auto_reconnect: true,
            http_timeout_secs: default_http_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl ServerConfig {
    /// Client settings derived from this section
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.ws_url)
            .http_base_url(&self.http_base_url)
            .reconnect_delay(Duration::from_millis(self.reconnect_delay_ms))
            .auto_reconnect(self.auto_reconnect)
            .http_timeout(Duration::from_secs(self.http_timeout_secs))
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
