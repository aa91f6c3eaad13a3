//! In-memory socket connector.
//!
//! Lets tests drive connection state and inbound frames, and assert what was
//! written to the wire.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::ports::outbound::{
    ConnectionState, InboundSink, SocketConnector, SocketHandle, TransportError,
};

struct Current {
    id: usize,
    state_tx: watch::Sender<ConnectionState>,
    inbound: InboundSink,
}

struct State {
    initial_state: ConnectionState,
    opened: Vec<String>,
    closes: usize,
    sent: Vec<String>,
    current: Option<Current>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            initial_state: ConnectionState::Connected,
            opened: Vec::new(),
            closes: 0,
            sent: Vec::new(),
            current: None,
        }
    }
}

/// `SocketConnector` whose sockets live in memory.
///
/// New sockets open straight into `Connected` unless `set_initial_state` says
/// otherwise. State changes and inbound frames target the most recently
/// opened socket. Clones share the same recorded state.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    state: Arc<Mutex<State>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that sockets opened from now on start in.
    pub fn set_initial_state(&self, initial: ConnectionState) {
        self.lock().initial_state = initial;
    }

    /// Move the most recently opened socket to `new_state`.
    pub fn set_state(&self, new_state: ConnectionState) {
        if let Some(current) = self.lock().current.as_ref() {
            current.state_tx.send_replace(new_state);
        }
    }

    /// Deliver a frame as if the server had sent it.
    pub fn push_inbound(&self, raw: impl Into<String>) -> bool {
        match self.lock().current.as_ref() {
            Some(current) => current.inbound.deliver(raw),
            None => false,
        }
    }

    pub fn open_count(&self) -> usize {
        self.lock().opened.len()
    }

    pub fn last_url(&self) -> Option<String> {
        self.lock().opened.last().cloned()
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    /// Every frame written so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Written frames decoded as JSON; frames that are not JSON are skipped.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.lock()
            .sent
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SocketConnector for InMemoryConnector {
    fn open(&self, url: &str, inbound: InboundSink) -> Box<dyn SocketHandle> {
        let mut s = self.lock();
        let id = s.opened.len();
        s.opened.push(url.to_string());

        let (state_tx, state_rx) = watch::channel(s.initial_state);
        s.current = Some(Current {
            id,
            state_tx,
            inbound,
        });

        Box::new(InMemorySocket {
            id,
            state_rx,
            shared: Arc::clone(&self.state),
            closed: false,
        })
    }
}

struct InMemorySocket {
    id: usize,
    state_rx: watch::Receiver<ConnectionState>,
    shared: Arc<Mutex<State>>,
    closed: bool,
}

impl InMemorySocket {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SocketHandle for InMemorySocket {
    fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if *self.state_rx.borrow() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        self.lock().sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut s = self.lock();
        s.closes += 1;
        if let Some(current) = s.current.as_ref().filter(|c| c.id == self.id) {
            current.state_tx.send_replace(ConnectionState::Disconnected);
        }
    }
}
