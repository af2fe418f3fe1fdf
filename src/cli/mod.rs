//! CLI interface for game-link
//!
//! Provides subcommands for:
//! - `connect`: Interactive session over the reconnecting WebSocket
//! - `send`: Send one message and print replies
//! - `fetch`: One-shot HTTP request
//! - `config`: Show configuration

mod connect;
mod fetch;
mod send;

pub use connect::ConnectArgs;
pub use fetch::FetchArgs;
pub use send::SendArgs;

use crate::ws::{InboundMessage, OutboundMessage};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "game-link")]
#[command(about = "Reconnecting WebSocket and HTTP link to the game server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session: stdin lines are sent, server messages printed
    Connect(ConnectArgs),
    /// Send one message and print replies
    Send(SendArgs),
    /// One-shot HTTP request to the server
    Fetch(FetchArgs),
    /// Show configuration
    Config,
}

/// Treat input as JSON when it parses, raw text otherwise
pub fn parse_outbound(input: &str) -> OutboundMessage {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => OutboundMessage::Json(value),
        Err(_) => OutboundMessage::Text(input.to_string()),
    }
}

/// Render an inbound message for the terminal
pub fn render_inbound(message: &InboundMessage) -> String {
    match message {
        InboundMessage::Json(value) => value.to_string(),
        InboundMessage::Raw(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_command() {
        let cli = Cli::try_parse_from([
            "game-link", "--config", "alt.toml", "fetch", "/api/state", "-X", "post", "--body", "{}",
        ])
        .unwrap();
        assert_eq!(cli.config, "alt.toml");
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.path, "/api/state");
                assert_eq!(args.method, "post");
                assert_eq!(args.body.as_deref(), Some("{}"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_outbound_json_or_text() {
        assert_eq!(parse_outbound(r#"{"a":1}"#), OutboundMessage::Json(json!({"a": 1})));
        assert_eq!(parse_outbound("hello"), OutboundMessage::Text("hello".into()));
    }

    #[test]
    fn test_render_inbound() {
        assert_eq!(render_inbound(&InboundMessage::Json(json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(render_inbound(&InboundMessage::Raw("not json".into())), "not json");
    }
}
