//! WebSocket types and configuration

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default backend WebSocket endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:4242";

/// Default backend HTTP endpoint
pub const DEFAULT_HTTP_BASE_URL: &str = "http://localhost:4242";

/// Status text reported when a connection attempt cannot be started
pub const FAILED_TO_CONNECT: &str = "Failed to connect";

/// Status text reported when the socket signals an error
pub const ERROR_OCCURRED: &str = "Error occurred";

/// Status text reported when an open socket closes
pub const DISCONNECTED_RECONNECTING: &str = "Disconnected. Reconnecting...";

/// Reconnecting client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Base URL for HTTP requests made through `fetch`
    pub http_base_url: String,
    /// Delay between a close and the next connection attempt
    pub reconnect_delay: Duration,
    /// Whether a closed socket schedules a reconnect
    pub auto_reconnect: bool,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            http_base_url: DEFAULT_HTTP_BASE_URL.to_string(),
            reconnect_delay: Duration::from_millis(3000),
            auto_reconnect: true,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given WebSocket URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the HTTP base URL
    pub fn http_base_url(mut self, url: impl Into<String>) -> Self {
        self.http_base_url = url.into();
        self
    }

    /// Set the reconnect delay
    pub fn reconnect_delay(mut self, d: Duration) -> Self {
        self.reconnect_delay = d;
        self
    }

    /// Enable or disable automatic reconnection
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the HTTP request timeout
    pub fn http_timeout(mut self, d: Duration) -> Self {
        self.http_timeout = d;
        self
    }
}

/// Lifecycle state of the logical connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Lifecycle events emitted by a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake completed
    Open,
    /// Text frame received
    Message(String),
    /// Transport error. Only reported to observers; the state is left alone,
    /// so a [`Connector`](super::Connector) must send `Close` after it.
    Error(String),
    /// Socket closed
    Close,
}

/// Message delivered to registered handlers
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Payload parsed as JSON
    Json(Value),
    /// Payload that is not JSON, unchanged
    Raw(String),
}

impl InboundMessage {
    /// Parse a text frame, keeping the raw text when it is not JSON
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => InboundMessage::Json(value),
            Err(_) => InboundMessage::Raw(text),
        }
    }

    /// The JSON value, if the payload parsed
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            InboundMessage::Json(v) => Some(v),
            InboundMessage::Raw(_) => None,
        }
    }

    /// The `type` field of a JSON object payload
    pub fn message_type(&self) -> Option<&str> {
        self.as_json()?.get("type")?.as_str()
    }
}

/// Payload accepted by `send`
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Structured value, serialized before transmission
    Json(Value),
    /// Text sent exactly as given
    Text(String),
}

impl OutboundMessage {
    /// Render the wire text for this payload
    pub fn into_wire(self) -> String {
        match self {
            OutboundMessage::Json(value) => value.to_string(),
            OutboundMessage::Text(text) => text,
        }
    }
}

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        OutboundMessage::Json(value)
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        OutboundMessage::Text(text)
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        OutboundMessage::Text(text.to_string())
    }
}

/// Handshake sent as soon as a socket opens
#[derive(Debug, Clone, Serialize)]
pub struct ClientHello {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
}

impl Default for ClientHello {
    fn default() -> Self {
        Self {
            kind: "connect",
            message: "Client connected",
        }
    }
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// URL could not be turned into a handshake request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "ws://localhost:4242");
        assert_eq!(config.http_base_url, "http://localhost:4242");
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert!(config.auto_reconnect);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("ws://game.test:9000")
            .http_base_url("http://game.test:9000")
            .reconnect_delay(Duration::from_millis(500))
            .auto_reconnect(false)
            .http_timeout(Duration::from_secs(2));

        assert_eq!(config.url, "ws://game.test:9000");
        assert_eq!(config.http_base_url, "http://game.test:9000");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
        assert!(!config.auto_reconnect);
        assert_eq!(config.http_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_inbound_parse_json() {
        let msg = InboundMessage::parse(r#"{"type":"chat","text":"hi"}"#.to_string());
        assert_eq!(msg, InboundMessage::Json(json!({"type": "chat", "text": "hi"})));
        assert_eq!(msg.message_type(), Some("chat"));
    }

    #[test]
    fn test_inbound_parse_raw_fallback() {
        let msg = InboundMessage::parse("not json".to_string());
        assert_eq!(msg, InboundMessage::Raw("not json".to_string()));
        assert!(msg.as_json().is_none());
        assert!(msg.message_type().is_none());
    }

    #[test]
    fn test_inbound_parse_scalar_json() {
        assert_eq!(InboundMessage::parse("42".to_string()), InboundMessage::Json(json!(42)));
    }

    #[test]
    fn test_outbound_wire_text() {
        assert_eq!(OutboundMessage::from(json!({"a": 1})).into_wire(), r#"{"a":1}"#);
        assert_eq!(OutboundMessage::from("plain").into_wire(), "plain");
    }

    #[test]
    fn test_client_hello_shape() {
        let value = serde_json::to_value(ClientHello::default()).unwrap();
        assert_eq!(value, json!({"type": "connect", "message": "Client connected"}));
    }

    #[test]
    fn test_ws_error_display() {
        let err = WsError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        let err = WsError::InvalidUrl("nope".to_string());
        assert_eq!(err.to_string(), "Invalid URL: nope");
    }
}
