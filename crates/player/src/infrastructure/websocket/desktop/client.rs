//! Desktop WebSocket client using tokio-tungstenite
//!
//! Each socket is driven by one spawned task that owns the stream. The handle
//! talks to it through an outbound queue and a close signal, and observes it
//! through a `watch` of its `ConnectionState`.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::ports::outbound::{
    ConnectionState, InboundSink, SocketConnector, SocketHandle, TransportError,
};

/// Opens tokio-tungstenite sockets. Must be used from inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SocketConnector for WsConnector {
    fn open(&self, url: &str, inbound: InboundSink) -> Box<dyn SocketHandle> {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(run_socket(
                    url.to_string(),
                    inbound,
                    state_tx,
                    outbound_rx,
                    close_rx,
                ));
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "No tokio runtime, cannot open game socket");
                state_tx.send_replace(ConnectionState::Failed);
            }
        }

        Box::new(WsSocket {
            state_rx,
            outbound: outbound_tx,
            close_tx: Some(close_tx),
        })
    }
}

struct WsSocket {
    state_rx: watch::Receiver<ConnectionState>,
    outbound: mpsc::UnboundedSender<String>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl SocketHandle for WsSocket {
    fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    fn send_text(&self, text: String) -> Result<(), TransportError> {
        if *self.state_rx.borrow() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        self.outbound
            .send(text)
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            // The task may already have exited on its own.
            let _ = tx.send(());
        }
    }
}

/// Drive one socket until it closes. Dropping the handle also closes it.
async fn run_socket(
    url: String,
    inbound: InboundSink,
    state: watch::Sender<ConnectionState>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let stream = tokio::select! {
        result = connect_async(url.as_str()) => match result {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to connect to game service");
                state.send_replace(ConnectionState::Failed);
                return;
            }
        },
        _ = &mut close_rx => {
            tracing::debug!(url = %url, "Socket closed before the handshake finished");
            state.send_replace(ConnectionState::Disconnected);
            return;
        }
    };

    tracing::info!(url = %url, "Connected to game service");
    state.send_replace(ConnectionState::Connected);

    let (mut write, mut read) = stream.split();

    let final_state = loop {
        tokio::select! {
            _ = &mut close_rx => {
                if let Err(e) = write.close().await {
                    tracing::debug!(error = %e, "Error while closing game socket");
                }
                break ConnectionState::Disconnected;
            }
            Some(text) = outbound.recv() => {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::error!(error = %e, "Failed to send message");
                    break ConnectionState::Failed;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    inbound.deliver(text);
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(url = %url, "Server closed connection");
                    break ConnectionState::Disconnected;
                }
                // Binary frames carry nothing for us; ping/pong is handled by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "WebSocket error");
                    break ConnectionState::Failed;
                }
            },
        }
    };

    state.send_replace(final_state);
}
