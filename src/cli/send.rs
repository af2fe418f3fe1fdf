//! Send command implementation

use super::{parse_outbound, render_inbound};
use crate::ws::{ConnectionCallback, InboundMessage, ReconnectingClient};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Payload to send: JSON if it parses, raw text otherwise
    pub payload: String,

    /// Seconds to wait for the connection to open
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Milliseconds to keep printing replies after sending
    #[arg(long, default_value_t = 500)]
    pub linger: u64,
}

impl SendArgs {
    pub async fn execute(&self, client: &ReconnectingClient) -> anyhow::Result<()> {
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        let on_open: ConnectionCallback = Arc::new(move |connected: bool, _message: Option<&str>| {
            if connected {
                let _ = open_tx.send(());
            }
        });
        client.on_connection_change(on_open.clone());
        client.on_message(Arc::new(|message: &InboundMessage| {
            println!("<- {}", render_inbound(message));
        }));

        client.connect();
        let opened = tokio::time::timeout(Duration::from_secs(self.timeout), open_rx.recv()).await;
        client.off_connection_change(&on_open);

        if !matches!(opened, Ok(Some(()))) {
            client.disconnect();
            anyhow::bail!("Could not connect to {} within {}s", client.url(), self.timeout);
        }

        if !client.send(parse_outbound(&self.payload)) {
            client.disconnect();
            anyhow::bail!("Connection dropped before the message was sent");
        }

        tokio::time::sleep(Duration::from_millis(self.linger)).await;
        client.disconnect();
        Ok(())
    }
}
