//! Connect command implementation

use super::{parse_outbound, render_inbound};
use crate::status::StatusDisplay;
use crate::ws::{InboundMessage, MessageHandler, ReconnectingClient};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Seconds between connection status reports
    #[arg(long, default_value_t = 1)]
    pub status_interval: u64,
}

impl ConnectArgs {
    pub async fn execute(&self, client: &ReconnectingClient) -> anyhow::Result<()> {
        let status = StatusDisplay::attach(client);
        let printer: MessageHandler = Arc::new(|message: &InboundMessage| {
            println!("<- {}", render_inbound(message));
        });
        client.on_message(printer.clone());
        client.connect();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(Duration::from_secs(self.status_interval.max(1)));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed, ending session");
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if !client.send(parse_outbound(line)) {
                        eprintln!("Not connected, message dropped");
                    }
                }
                _ = ticker.tick() => {
                    tracing::debug!(
                        connected = client.is_connected(),
                        status = %status.text(),
                        "Session status"
                    );
                }
                _ = &mut shutdown => {
                    tracing::info!("Interrupted, ending session");
                    break;
                }
            }
        }

        client.off_message(&printer);
        client.disconnect();
        Ok(())
    }
}
