//! WebSocket client library
//!
//! Provides the reconnecting client that owns the game's single server
//! connection, plus the socket factory it opens connections through.

mod client;
mod transport;
mod types;

pub use client::{ConnectionCallback, MessageHandler, ReconnectingClient};
pub use transport::{
    Connector, SocketCommand, SocketHandle, SocketPeer, SocketWriter, TungsteniteConnector,
};
pub use types::{
    ClientConfig, ClientHello, ConnectionState, InboundMessage, OutboundMessage, SocketEvent,
    WsError, DEFAULT_HTTP_BASE_URL, DEFAULT_WS_URL, DISCONNECTED_RECONNECTING, ERROR_OCCURRED,
    FAILED_TO_CONNECT,
};
