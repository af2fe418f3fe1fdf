//! Socket factory seam and the tokio-tungstenite socket

use super::types::{SocketEvent, WsError};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Opens sockets for the reconnecting client.
///
/// `open` only starts the attempt: an `Err` means the attempt could not even
/// be initiated. Everything after that (handshake, frames, failures) arrives
/// as [`SocketEvent`]s on the returned handle.
pub trait Connector: Send + Sync + 'static {
    fn open(&self, url: &str) -> Result<SocketHandle, WsError>;
}

/// Command from the client to the socket task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    Text(String),
    Close,
}

/// Client side of one socket
#[derive(Debug)]
pub struct SocketHandle {
    pub events: mpsc::UnboundedReceiver<SocketEvent>,
    pub writer: SocketWriter,
}

/// Connector side of one socket
#[derive(Debug)]
pub struct SocketPeer {
    pub events: mpsc::UnboundedSender<SocketEvent>,
    pub commands: mpsc::UnboundedReceiver<SocketCommand>,
}

impl SocketHandle {
    /// Create a connected handle/peer pair
    pub fn channel() -> (SocketHandle, SocketPeer) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            SocketHandle {
                events: event_rx,
                writer: SocketWriter { tx: cmd_tx },
            },
            SocketPeer {
                events: event_tx,
                commands: cmd_rx,
            },
        )
    }
}

/// Outbound half of a socket. Dropping it closes the socket.
#[derive(Debug, Clone)]
pub struct SocketWriter {
    tx: mpsc::UnboundedSender<SocketCommand>,
}

impl SocketWriter {
    /// Queue a text frame on the socket
    pub fn send_text(&self, text: String) -> Result<(), WsError> {
        self.tx
            .send(SocketCommand::Text(text))
            .map_err(|_| WsError::ChannelClosed)
    }

    /// Ask the socket to close
    pub fn close(&self) {
        let _ = self.tx.send(SocketCommand::Close);
    }
}

/// Production connector backed by tokio-tungstenite
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    ping_interval: Duration,
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Build the handshake request, rejecting anything that is not a ws/wss URL
    fn build_request(url: &str) -> Result<Request, WsError> {
        let request = url
            .into_client_request()
            .map_err(|e| WsError::InvalidUrl(e.to_string()))?;

        match request.uri().scheme_str() {
            Some("ws") | Some("wss") => Ok(request),
            other => Err(WsError::InvalidUrl(format!(
                "unsupported scheme {:?} in {}",
                other.unwrap_or(""),
                url
            ))),
        }
    }

    /// Own one socket for its whole life, reporting through `peer`
    async fn run_socket(request: Request, ping_interval: Duration, mut peer: SocketPeer) {
        if let Err(e) = Self::connect_and_stream(request, ping_interval, &mut peer).await {
            tracing::warn!(error = %e, "WebSocket error");
            let _ = peer.events.send(SocketEvent::Error(e.to_string()));
        }
        let _ = peer.events.send(SocketEvent::Close);
    }

    /// Connect to WebSocket and stream frames until close
    async fn connect_and_stream(
        request: Request,
        ping_interval: Duration,
        peer: &mut SocketPeer,
    ) -> Result<(), WsError> {
        tracing::info!(uri = %request.uri(), "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(request)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        if peer.events.send(SocketEvent::Open).is_err() {
            tracing::debug!("Socket released before open, closing");
            let _ = write.send(Message::Close(None)).await;
            return Ok(());
        }

        let mut ping_interval = tokio::time::interval(ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if peer.events.send(SocketEvent::Message(text)).is_err() {
                                tracing::debug!("Socket released, closing connection");
                                let _ = write.send(Message::Close(None)).await;
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                            Ok(text) => {
                                if peer.events.send(SocketEvent::Message(text)).is_err() {
                                    let _ = write.send(Message::Close(None)).await;
                                    return Ok(());
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Skipping non UTF-8 binary frame");
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Received close frame");
                            return Ok(());
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                    }
                }

                cmd = peer.commands.recv() => {
                    match cmd {
                        Some(SocketCommand::Text(text)) => {
                            write.send(Message::Text(text)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(SocketCommand::Close) | None => {
                            tracing::debug!("Closing WebSocket on request");
                            let _ = write.send(Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

impl Connector for TungsteniteConnector {
    fn open(&self, url: &str) -> Result<SocketHandle, WsError> {
        let request = Self::build_request(url)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (socket, peer) = SocketHandle::channel();
        runtime.spawn(Self::run_socket(request, self.ping_interval, peer));
        Ok(socket)
    }
}
