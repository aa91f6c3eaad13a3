//! Socket Port - boundary to the game service's bidirectional channel
//!
//! The session layer never touches a WebSocket directly. A `SocketConnector`
//! opens channels and hands back a `SocketHandle`; every inbound text frame is
//! pushed into the `InboundSink` registered at open time.

use tokio::sync::{mpsc, watch};

/// Connection state of one socket handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress
    Connecting,
    /// Open and ready to send
    Connected,
    /// Closed by either side
    Disconnected,
    /// Could not be opened, or broke with an error
    Failed,
}

impl ConnectionState {
    /// A handle in a terminal state will never carry traffic again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Socket is not connected")]
    NotConnected,
    #[error("Socket writer has shut down")]
    Closed,
}

/// The single consumer of inbound frames.
///
/// Frames are queued unmodified and in arrival order. Empty frames are dropped
/// here so the consumer never sees them.
#[derive(Debug, Clone)]
pub struct InboundSink {
    tx: mpsc::UnboundedSender<String>,
}

impl InboundSink {
    /// Create a sink together with the receiver its frames are queued on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue one raw frame for the consumer.
    ///
    /// Returns false if the frame was dropped (empty, or the consumer is gone).
    pub fn deliver(&self, raw: impl Into<String>) -> bool {
        let raw = raw.into();
        if raw.is_empty() {
            tracing::debug!("Dropping empty inbound frame");
            return false;
        }
        self.tx.send(raw).is_ok()
    }
}

/// Opens channels to the game service.
pub trait SocketConnector: Send + Sync {
    /// Start opening a channel to `url`.
    ///
    /// Returns immediately; the handle starts out `Connecting` and reports
    /// failures through its state rather than through this call.
    fn open(&self, url: &str, inbound: InboundSink) -> Box<dyn SocketHandle>;
}

/// One open (or opening) channel.
pub trait SocketHandle: Send + Sync {
    /// Subscribe to state changes.
    fn watch_state(&self) -> watch::Receiver<ConnectionState>;

    /// Current state.
    fn state(&self) -> ConnectionState {
        let rx = self.watch_state();
        let state = *rx.borrow();
        state
    }

    /// Queue a text frame on the writer. Frames are written in call order.
    fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Start a graceful close. Calling it twice is harmless.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_forwards_frames_in_order() {
        let (sink, mut rx) = InboundSink::channel();

        assert!(sink.deliver("one"));
        assert!(sink.deliver(String::from("two")));

        assert_eq!(rx.try_recv().ok().as_deref(), Some("one"));
        assert_eq!(rx.try_recv().ok().as_deref(), Some("two"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sink_drops_empty_frames() {
        let (sink, mut rx) = InboundSink::channel();

        assert!(!sink.deliver(""));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sink_reports_missing_consumer() {
        let (sink, rx) = InboundSink::channel();
        drop(rx);

        assert!(!sink.deliver("late"));
    }

    #[test]
    fn terminal_states() {
        assert!(ConnectionState::Failed.is_terminal());
        assert!(ConnectionState::Disconnected.is_terminal());
        assert!(!ConnectionState::Connecting.is_terminal());
        assert!(!ConnectionState::Connected.is_terminal());
    }
}
