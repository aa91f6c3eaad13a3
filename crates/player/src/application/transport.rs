//! Transport channel to the game service.
//!
//! Holds at most one socket. `connect` is idempotent, `send` is best effort:
//! a directive sent while the socket is not open is dropped, never queued.
//! Every inbound frame goes to the single `InboundSink` given at construction.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::ports::outbound::{ConnectionState, InboundSink, SocketConnector, SocketHandle};

pub struct TransportChannel {
    url: String,
    connector: Arc<dyn SocketConnector>,
    inbound: InboundSink,
    socket: Mutex<Option<Box<dyn SocketHandle>>>,
}

impl TransportChannel {
    pub fn new(url: impl Into<String>, connector: Arc<dyn SocketConnector>, inbound: InboundSink) -> Self {
        Self {
            url: url.into(),
            connector,
            inbound,
            socket: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the channel unless a live one is already held.
    ///
    /// A held socket that has failed or been closed by the server is replaced.
    /// Open failures are reported through `state()`, not here.
    pub fn connect(&self) {
        let mut socket = self.lock();
        if let Some(current) = socket.as_ref() {
            let state = current.state();
            if !state.is_terminal() {
                tracing::debug!(url = %self.url, ?state, "Socket already held, connect is a no-op");
                return;
            }
            tracing::info!(url = %self.url, ?state, "Replacing dead socket");
        }

        tracing::info!(url = %self.url, "Opening game socket");
        *socket = Some(self.connector.open(&self.url, self.inbound.clone()));
    }

    /// Close and forget the channel. Does nothing if none is held.
    pub fn close(&self) {
        if let Some(mut current) = self.lock().take() {
            tracing::info!(url = %self.url, "Closing game socket");
            current.close();
        }
    }

    /// Transmit `message` if the channel is open; otherwise drop it silently.
    pub fn send(&self, message: &str) {
        let socket = self.lock();
        match socket.as_ref() {
            Some(current) if current.state() == ConnectionState::Connected => {
                if let Err(e) = current.send_text(message.to_string()) {
                    tracing::debug!(error = %e, "Dropping outbound message");
                }
            }
            Some(current) => {
                tracing::debug!(state = ?current.state(), "Socket not open, dropping outbound message");
            }
            None => {
                tracing::debug!("No socket, dropping outbound message");
            }
        }
    }

    /// State of the held socket; `Disconnected` when none is held.
    pub fn state(&self) -> ConnectionState {
        self.lock()
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Wait up to `timeout` for the held socket to be open.
    ///
    /// Returns false if no socket is held, it fails or closes first, or the
    /// timeout elapses.
    pub async fn wait_until_open(&self, timeout: Duration) -> bool {
        // Take a state receiver so no lock is held across the await.
        let rx = self.lock().as_ref().map(|s| s.watch_state());
        let Some(mut rx) = rx else {
            return false;
        };

        let ready = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| *state == ConnectionState::Connected || state.is_terminal()),
        )
        .await;

        match ready {
            Ok(Ok(state)) => *state == ConnectionState::Connected,
            Ok(Err(_)) => false,
            Err(_) => {
                tracing::warn!(url = %self.url, ?timeout, "Timed out waiting for game socket to open");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn SocketHandle>>> {
        // Nothing panics while the lock is held, so a poisoned lock still
        // holds a consistent value.
        self.socket.lock().unwrap_or_else(|e| e.into_inner())
    }
}
