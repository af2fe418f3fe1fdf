//! Reconnecting WebSocket client with observer fan-out

use super::transport::{Connector, SocketWriter, TungsteniteConnector};
use super::types::{
    ClientConfig, ClientHello, ConnectionState, InboundMessage, OutboundMessage, SocketEvent,
    DISCONNECTED_RECONNECTING, ERROR_OCCURRED, FAILED_TO_CONNECT,
};
use crate::http::{FetchOptions, HttpError, RestClient};
use crate::telemetry::{increment, CounterMetric};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Observer for inbound messages
pub type MessageHandler = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

/// Observer for connection changes: `(connected, status message)`
pub type ConnectionCallback = Arc<dyn Fn(bool, Option<&str>) + Send + Sync>;

/// Owns one logical connection to the game server.
///
/// At most one socket is live at a time. When an open socket closes and
/// auto-reconnect is enabled, a single reconnect attempt is scheduled after
/// the configured delay. Inbound messages and connection changes are fanned
/// out to registered observers in registration order; a panicking observer is
/// logged and skipped without affecting the others.
///
/// Cloning yields another handle to the same connection. Must be used from
/// within a tokio runtime.
#[derive(Clone)]
pub struct ReconnectingClient {
    shared: Arc<Shared>,
}

struct Shared {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    http: RestClient,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    socket: Option<ActiveSocket>,
    reconnect: Option<JoinHandle<()>>,
    /// Bumped whenever the socket is replaced or torn down
    generation: u64,
    message_handlers: Vec<MessageHandler>,
    connection_callbacks: Vec<ConnectionCallback>,
}

struct ActiveSocket {
    generation: u64,
    writer: SocketWriter,
    pump: JoinHandle<()>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.socket
            .as_ref()
            .is_some_and(|s| s.generation == generation)
    }
}

impl ReconnectingClient {
    /// Create a client that opens real WebSocket connections
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Self::with_connector(config, TungsteniteConnector::new())
    }

    /// Create a client that opens sockets through `connector`
    pub fn with_connector(
        config: ClientConfig,
        connector: impl Connector,
    ) -> Result<Self, HttpError> {
        let http = RestClient::new(&config.http_base_url, config.http_timeout)?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                connector: Arc::new(connector),
                http,
                inner: Mutex::new(Inner::default()),
            }),
        })
    }

    /// Get the configured WebSocket URL
    pub fn url(&self) -> &str {
        &self.shared.config.url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a connection unless one already exists.
    ///
    /// Cancels any pending reconnect. If the attempt cannot even be started,
    /// observers are told `(false, "Failed to connect")` and no retry is
    /// scheduled.
    pub fn connect(&self) {
        let mut inner = self.inner();

        if let Some(timer) = inner.reconnect.take() {
            timer.abort();
        }

        if inner.socket.is_some() {
            tracing::debug!(state = ?inner.state, "Connection already exists");
            return;
        }

        increment(CounterMetric::ConnectAttempts);

        match self.shared.connector.open(&self.shared.config.url) {
            Ok(handle) => {
                inner.generation += 1;
                let generation = inner.generation;
                inner.state = ConnectionState::Connecting;

                let pump = tokio::spawn(Self::run_event_pump(
                    Arc::downgrade(&self.shared),
                    generation,
                    handle.events,
                ));
                inner.socket = Some(ActiveSocket {
                    generation,
                    writer: handle.writer,
                    pump,
                });
                tracing::info!(url = %self.shared.config.url, generation, "Connecting to server");
            }
            Err(e) => {
                inner.state = ConnectionState::Disconnected;
                drop(inner);

                tracing::error!(url = %self.shared.config.url, error = %e, "Failed to create WebSocket");
                self.notify_connection_change(false, Some(FAILED_TO_CONNECT));
            }
        }
    }

    /// Send a payload if the connection is open.
    ///
    /// Nothing is queued: returns false and drops the payload when not
    /// connected.
    pub fn send(&self, payload: impl Into<OutboundMessage>) -> bool {
        let writer = {
            let inner = self.inner();
            match (&inner.state, &inner.socket) {
                (ConnectionState::Connected, Some(socket)) => Some(socket.writer.clone()),
                _ => None,
            }
        };

        let Some(writer) = writer else {
            tracing::warn!("WebSocket not connected. Cannot send message.");
            return false;
        };

        let text = payload.into().into_wire();
        let bytes = text.len();
        match writer.send_text(text) {
            Ok(()) => {
                increment(CounterMetric::MessagesSent);
                tracing::debug!(bytes, "Sent message");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket send failed");
                false
            }
        }
    }

    /// Serialize `value` to JSON and send it
    pub fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.send(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize outbound message");
                false
            }
        }
    }

    /// Register an inbound message observer. Duplicates are invoked once per
    /// registration.
    pub fn on_message(&self, handler: MessageHandler) {
        self.inner().message_handlers.push(handler);
    }

    /// Remove the first registration of `handler`
    pub fn off_message(&self, handler: &MessageHandler) {
        let mut inner = self.inner();
        if let Some(index) = inner
            .message_handlers
            .iter()
            .position(|h| Arc::ptr_eq(h, handler))
        {
            inner.message_handlers.remove(index);
        }
    }

    /// Register a connection change observer
    pub fn on_connection_change(&self, callback: ConnectionCallback) {
        self.inner().connection_callbacks.push(callback);
    }

    /// Remove the first registration of `callback`
    pub fn off_connection_change(&self, callback: &ConnectionCallback) {
        let mut inner = self.inner();
        if let Some(index) = inner
            .connection_callbacks
            .iter()
            .position(|c| Arc::ptr_eq(c, callback))
        {
            inner.connection_callbacks.remove(index);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner().state == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.inner().state
    }

    /// Tear down the connection and cancel any pending reconnect.
    ///
    /// Idempotent. The released socket reports nothing further; `connect()`
    /// may be called again afterwards.
    pub fn disconnect(&self) {
        let socket = {
            let mut inner = self.inner();
            if let Some(timer) = inner.reconnect.take() {
                timer.abort();
            }
            inner.generation += 1;
            inner.state = ConnectionState::Disconnected;
            inner.socket.take()
        };

        if let Some(socket) = socket {
            socket.writer.close();
            socket.pump.abort();
            tracing::info!(url = %self.shared.config.url, "WebSocket disconnected");
        }
    }

    /// One-shot HTTP request against the server's HTTP endpoint
    pub async fn fetch(&self, path: &str, options: FetchOptions) -> Result<Value, HttpError> {
        self.shared.http.fetch(path, options).await
    }

    /// Forward socket events until the socket closes or is released
    async fn run_event_pump(
        shared: Weak<Shared>,
        generation: u64,
        mut events: mpsc::UnboundedReceiver<SocketEvent>,
    ) {
        while let Some(event) = events.recv().await {
            let closed = event == SocketEvent::Close;
            if !Self::dispatch(&shared, generation, event) || closed {
                return;
            }
        }
        // Connector went away without reporting a close
        Self::dispatch(&shared, generation, SocketEvent::Close);
    }

    fn dispatch(shared: &Weak<Shared>, generation: u64, event: SocketEvent) -> bool {
        match shared.upgrade() {
            Some(shared) => ReconnectingClient { shared }.handle_event(generation, event),
            None => false,
        }
    }

    /// Apply one socket event. Returns false if the socket is stale.
    fn handle_event(&self, generation: u64, event: SocketEvent) -> bool {
        match event {
            SocketEvent::Open => {
                {
                    let mut inner = self.inner();
                    if !inner.is_current(generation) {
                        return false;
                    }
                    inner.state = ConnectionState::Connected;
                }
                tracing::info!(url = %self.shared.config.url, "WebSocket connected");
                self.notify_connection_change(true, None);
                self.send_json(&ClientHello::default());
            }
            SocketEvent::Message(text) => {
                if !self.inner().is_current(generation) {
                    return false;
                }
                increment(CounterMetric::MessagesReceived);
                self.handle_message(InboundMessage::parse(text));
            }
            SocketEvent::Error(error) => {
                if !self.inner().is_current(generation) {
                    return false;
                }
                tracing::error!(%error, "WebSocket error");
                self.notify_connection_change(false, Some(ERROR_OCCURRED));
            }
            SocketEvent::Close => {
                {
                    let mut inner = self.inner();
                    if !inner.is_current(generation) {
                        return false;
                    }
                    inner.socket = None;
                    inner.state = ConnectionState::Disconnected;
                }
                tracing::info!(url = %self.shared.config.url, "WebSocket closed");
                self.notify_connection_change(false, Some(DISCONNECTED_RECONNECTING));

                if self.shared.config.auto_reconnect {
                    self.schedule_reconnect(generation);
                }
            }
        }
        true
    }

    /// Arm the single reconnect slot, replacing any pending attempt.
    ///
    /// Skipped if an observer already reconnected or disconnected while the
    /// close was being reported.
    fn schedule_reconnect(&self, generation: u64) {
        let mut inner = self.inner();
        if inner.generation != generation || inner.socket.is_some() {
            return;
        }

        if let Some(timer) = inner.reconnect.take() {
            timer.abort();
        }

        let delay = self.shared.config.reconnect_delay;
        let shared = Arc::downgrade(&self.shared);
        inner.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                let client = ReconnectingClient { shared };
                // Release our own slot so connect() does not abort this task
                client.inner().reconnect.take();
                tracing::info!("Attempting to reconnect...");
                client.connect();
            }
        }));

        increment(CounterMetric::ReconnectsScheduled);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
    }

    fn handle_message(&self, message: InboundMessage) {
        tracing::debug!(?message, "Received message");

        let handlers = self.inner().message_handlers.clone();
        for handler in &handlers {
            isolate("message handler", || handler(&message));
        }
    }

    fn notify_connection_change(&self, connected: bool, message: Option<&str>) {
        let callbacks = self.inner().connection_callbacks.clone();
        for callback in &callbacks {
            isolate("connection callback", || callback(connected, message));
        }
    }
}

/// Run one observer, logging a panic instead of propagating it
fn isolate(kind: &'static str, f: impl FnOnce()) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(f)) {
        increment(CounterMetric::ObserverPanics);
        tracing::error!(observer = kind, panic = %panic_message(&*panic), "Error in {}", kind);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
