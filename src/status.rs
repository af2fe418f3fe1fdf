//! Connection status line shown to the player

use crate::ws::{ConnectionCallback, ReconnectingClient};
use std::sync::{Arc, Mutex, PoisonError};

/// Text status display fed by connection change notifications
#[derive(Debug, Clone)]
pub struct StatusDisplay {
    url: String,
    text: Arc<Mutex<String>>,
}

impl StatusDisplay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Arc::new(Mutex::new("Disconnected".to_string())),
        }
    }

    /// Create a display for `client` and subscribe it to connection changes
    pub fn attach(client: &ReconnectingClient) -> Self {
        let display = Self::new(client.url());
        client.on_connection_change(display.callback());
        display
    }

    /// Callback that keeps this display up to date
    pub fn callback(&self) -> ConnectionCallback {
        let display = self.clone();
        Arc::new(move |connected: bool, message: Option<&str>| {
            display.update(connected, message);
        })
    }

    /// Apply a connection change. An explicit message wins over the default text.
    pub fn update(&self, connected: bool, message: Option<&str>) {
        let text = match message {
            Some(message) => message.to_string(),
            None if connected => format!("Connected to {}", self.url),
            None => "Disconnected".to_string(),
        };

        tracing::info!(status = %text, "Connection status");
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text;
    }

    /// Current status text
    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_text() {
        let display = StatusDisplay::new("ws://localhost:4242");
        assert_eq!(display.text(), "Disconnected");
    }

    #[test]
    fn test_connected_without_message() {
        let display = StatusDisplay::new("ws://localhost:4242");
        display.update(true, None);
        assert_eq!(display.text(), "Connected to ws://localhost:4242");
    }

    #[test]
    fn test_message_wins() {
        let display = StatusDisplay::new("ws://localhost:4242");
        display.update(false, Some("Disconnected. Reconnecting..."));
        assert_eq!(display.text(), "Disconnected. Reconnecting...");

        display.update(false, None);
        assert_eq!(display.text(), "Disconnected");
    }

    #[test]
    fn test_callback_shares_state() {
        let display = StatusDisplay::new("ws://game.test");
        let callback = display.callback();
        callback(true, None);
        assert_eq!(display.text(), "Connected to ws://game.test");
    }
}
