//! In-memory connector for driving the reconnecting client in tests.
//!
//! Every `open` creates a socket the test controls: push lifecycle events with
//! [`MockConnector::emit`] and read what the client wrote with
//! [`MockConnector::sent`].

use crate::ws::{Connector, SocketCommand, SocketEvent, SocketHandle, SocketPeer, WsError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::error::TryRecvError;

/// Connector whose sockets are scripted by the test
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    urls: Vec<String>,
    sockets: Vec<MockSocket>,
    refuse_next: usize,
}

struct MockSocket {
    peer: SocketPeer,
    sent: Vec<String>,
    closed: bool,
}

impl MockSocket {
    /// Pull everything the client queued so far
    fn drain(&mut self) {
        loop {
            match self.peer.commands.try_recv() {
                Ok(SocketCommand::Text(text)) => self.sent.push(text),
                Ok(SocketCommand::Close) | Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
    }
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` opens fail before any socket exists
    pub fn refuse_next(&self, count: usize) {
        self.state().refuse_next = count;
    }

    /// Number of opens, refused ones included
    pub fn attempts(&self) -> usize {
        self.state().urls.len()
    }

    /// Number of sockets actually created
    pub fn sockets(&self) -> usize {
        self.state().sockets.len()
    }

    /// URLs passed to `open`, in order
    pub fn urls(&self) -> Vec<String> {
        self.state().urls.clone()
    }

    /// Deliver an event on socket `index`. Returns false if the client
    /// released that socket.
    pub fn emit(&self, index: usize, event: SocketEvent) -> bool {
        let state = self.state();
        match state.sockets.get(index) {
            Some(socket) => socket.peer.events.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver an event on the most recent socket
    pub fn emit_latest(&self, event: SocketEvent) -> bool {
        let last = self.sockets().checked_sub(1);
        match last {
            Some(index) => self.emit(index, event),
            None => false,
        }
    }

    /// Text frames the client wrote to socket `index`
    pub fn sent(&self, index: usize) -> Vec<String> {
        let mut state = self.state();
        match state.sockets.get_mut(index) {
            Some(socket) => {
                socket.drain();
                socket.sent.clone()
            }
            None => Vec::new(),
        }
    }

    /// Whether the client closed or released socket `index`
    pub fn is_closed(&self, index: usize) -> bool {
        let mut state = self.state();
        match state.sockets.get_mut(index) {
            Some(socket) => {
                socket.drain();
                socket.closed
            }
            None => false,
        }
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &str) -> Result<SocketHandle, WsError> {
        let mut state = self.state();
        state.urls.push(url.to_string());

        if state.refuse_next > 0 {
            state.refuse_next -= 1;
            return Err(WsError::InvalidUrl(format!("refused: {}", url)));
        }

        let (handle, peer) = SocketHandle::channel();
        state.sockets.push(MockSocket {
            peer,
            sent: Vec::new(),
            closed: false,
        });
        Ok(handle)
    }
}
