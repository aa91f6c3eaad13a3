//! Game session store.
//!
//! `GameSessionStore` is the single owner of the tracked `GameSession`. It
//! runs the lobby lifecycle requests, sends directives over the transport and
//! applies inbound server events in arrival order. Views observe the session
//! through `subscribe()`.
//!
//! Only one lifecycle request runs at a time; a second one is rejected with
//! `LifecycleError::InFlight` without touching the network. Leaving (or
//! resetting) while a request is pending makes its response stale, and a stale
//! response is discarded with `LifecycleError::Superseded`.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use delta_shared::{ClientMessage, ServerMessage, UNKNOWN_ERROR_MESSAGE};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::application::api::LobbyApi;
use crate::application::transport::TransportChannel;
use crate::config::ClientConfig;
use crate::ports::outbound::{
    ApiError, ClockPort, ConnectionState, InboundSink, RawApiPort, SocketConnector,
};
use crate::state::{GameKind, GameSession, GameStatus, InvalidTransition};

/// The three ways of entering a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    FindMatch,
    CreatePrivateGame,
    JoinPrivateGame,
}

impl fmt::Display for LifecycleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FindMatch => "find_match",
            Self::CreatePrivateGame => "create_private_game",
            Self::JoinPrivateGame => "join_private_game",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Another lifecycle request is still pending.
    #[error("{0} is already in progress")]
    InFlight(LifecycleRequest),

    /// The session was left or reset while the request was pending.
    #[error("session changed while the request was pending")]
    Superseded,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct GameSessionStore {
    api: LobbyApi,
    transport: TransportChannel,
    clock: Arc<dyn ClockPort>,
    connect_timeout: Duration,
    session: watch::Sender<GameSession>,
    inbound: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>>,
    pending: Mutex<Option<LifecycleRequest>>,
    /// Bumped whenever the session is dropped on purpose (leave, reset).
    epoch: AtomicU64,
    /// Never sent on; its receivers see it close when the store is dropped.
    alive: watch::Sender<()>,
}

impl GameSessionStore {
    pub fn new(
        api: Arc<dyn RawApiPort>,
        connector: Arc<dyn SocketConnector>,
        clock: Arc<dyn ClockPort>,
        config: &ClientConfig,
    ) -> Self {
        let (sink, inbound) = InboundSink::channel();
        let (session, _) = watch::channel(GameSession::new());
        let (alive, _) = watch::channel(());

        Self {
            api: LobbyApi::new(api),
            transport: TransportChannel::new(config.ws_url.as_str(), connector, sink),
            clock,
            connect_timeout: config.connect_timeout,
            session,
            inbound: Arc::new(tokio::sync::Mutex::new(inbound)),
            pending: Mutex::new(None),
            epoch: AtomicU64::new(0),
            alive,
        }
    }

    /// Receiver that sees every session change.
    pub fn subscribe(&self) -> watch::Receiver<GameSession> {
        self.session.subscribe()
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> GameSession {
        self.session.borrow().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Lifecycle request currently pending, if any.
    pub fn pending_request(&self) -> Option<LifecycleRequest> {
        *lock(&self.pending)
    }

    // =========================================================================
    // Lifecycle requests
    // =========================================================================

    /// Enter anonymous matchmaking.
    pub async fn find_match(&self) -> Result<(), LifecycleError> {
        self.run_lifecycle(
            LifecycleRequest::FindMatch,
            self.api.find_game(),
            |session, found| {
                session.begin(found.game_id, GameKind::Matched, found.status, None);
            },
        )
        .await
    }

    /// Open a private room and wait in it for an opponent.
    pub async fn create_private_game(&self) -> Result<(), LifecycleError> {
        self.run_lifecycle(
            LifecycleRequest::CreatePrivateGame,
            self.api.create_private_game(),
            |session, created| {
                session.begin(
                    created.game_id,
                    GameKind::Private,
                    GameStatus::Waiting,
                    Some(created.join_code),
                );
            },
        )
        .await
    }

    /// Join someone else's private room by its code.
    pub async fn join_private_game(&self, join_code: &str) -> Result<(), LifecycleError> {
        self.run_lifecycle(
            LifecycleRequest::JoinPrivateGame,
            self.api.join_private_game(join_code),
            |session, joined| {
                session.begin(joined.game_id, GameKind::Private, GameStatus::Ready, None);
            },
        )
        .await
    }

    /// Shared flow of the three lifecycle requests.
    ///
    /// `call` is lazy, so nothing goes on the network until the pending slot
    /// has been claimed.
    async fn run_lifecycle<T>(
        &self,
        request: LifecycleRequest,
        call: impl Future<Output = Result<T, ApiError>>,
        adopt: impl FnOnce(&mut GameSession, T),
    ) -> Result<(), LifecycleError> {
        let _pending = PendingGuard::claim(&self.pending, request)?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        tracing::debug!(%request, "Lifecycle request started");
        let response = call.await;

        if self.is_stale(epoch) {
            tracing::info!(%request, "Session changed while pending, discarding response");
            return Err(LifecycleError::Superseded);
        }

        let value = match response {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%request, error = %e, "Lifecycle request failed, resetting session");
                self.session.send_modify(GameSession::reset);
                return Err(e.into());
            }
        };

        self.session.send_modify(|session| adopt(session, value));
        let snapshot = self.snapshot();
        let Some(game_id) = snapshot.game_id else {
            return Ok(());
        };
        tracing::info!(
            %request,
            game_id = %game_id,
            status = %snapshot.status,
            "Entered game"
        );

        self.transport.connect();
        if !self.transport.wait_until_open(self.connect_timeout).await {
            tracing::warn!(game_id = %game_id, "Game socket is not open, join_game will be dropped");
        }

        if self.is_stale(epoch) {
            tracing::info!(%request, game_id = %game_id, "Session changed while connecting, not joining");
            return Err(LifecycleError::Superseded);
        }

        self.send(&ClientMessage::JoinGame { game_id });
        Ok(())
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != epoch
    }

    // =========================================================================
    // Outbound actions
    // =========================================================================

    /// Play a word. The server decides whether it is valid or our turn.
    pub fn submit_word(&self, word: &str) {
        let game_id = self.session.borrow().game_id.clone();
        self.send(&ClientMessage::SubmitWord {
            game_id,
            word: word.to_string(),
        });
    }

    /// Tell the server we are leaving and forget the game immediately.
    pub fn leave_game(&self) {
        let game_id = self.session.borrow().game_id.clone();
        self.send(&ClientMessage::LeaveGame {
            game_id: game_id.clone(),
        });
        tracing::info!(game_id = ?game_id, "Left game");
        self.reset();
    }

    /// Forget the tracked game without telling the server.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.session.send_modify(GameSession::reset);
    }

    /// Close the game socket. The session is left as it is.
    pub fn close(&self) {
        self.transport.close();
    }

    fn send(&self, message: &ClientMessage) {
        match message.to_json() {
            Ok(json) => {
                tracing::debug!(action = message.action(), "Sending directive");
                self.transport.send(&json);
            }
            Err(e) => {
                tracing::error!(action = message.action(), error = %e, "Failed to encode directive");
            }
        }
    }

    // =========================================================================
    // Inbound events
    // =========================================================================

    /// Apply one raw server event to the session.
    ///
    /// Malformed, unknown and out-of-order events are logged and leave the
    /// session untouched.
    pub fn handle_update(&self, raw: &str) {
        let message = match ServerMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed server message");
                return;
            }
        };

        let kind = message.kind().to_owned();
        let applied = match message {
            ServerMessage::JoinedGame { game_id } => {
                tracing::info!(game_id = ?game_id, "Joined game channel");
                Ok(())
            }
            ServerMessage::GameStarted(payload) => {
                let now = self.clock.now();
                self.apply(|session| session.start(payload, now))
            }
            ServerMessage::WordSubmitted(payload) => {
                let now = self.clock.now();
                self.apply(|session| session.record_word(payload, now))
            }
            ServerMessage::GameEnded(payload) => {
                self.apply(|session| session.finish(payload, false))
            }
            ServerMessage::GameEndedTimeout(payload) => {
                self.apply(|session| session.finish(payload, true))
            }
            ServerMessage::Error(payload) => {
                let message = payload
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
                tracing::warn!(
                    error_type = ?payload.error_type,
                    message = %message,
                    "Server reported an error"
                );
                self.session
                    .send_modify(|session| session.record_error(message));
                Ok(())
            }
            ServerMessage::Unknown { kind } => {
                tracing::info!(kind = %kind, "Ignoring unknown server event");
                Ok(())
            }
        };

        match applied {
            Ok(()) => tracing::debug!(kind = %kind, "Applied server event"),
            Err(e) => tracing::warn!(kind = %kind, error = %e, "Ignoring out-of-order server event"),
        }
    }

    /// Run a transition, notifying subscribers only if it was accepted.
    fn apply(
        &self,
        transition: impl FnOnce(&mut GameSession) -> Result<(), InvalidTransition>,
    ) -> Result<(), InvalidTransition> {
        let mut result = Ok(());
        self.session.send_if_modified(|session| {
            result = transition(session);
            result.is_ok()
        });
        result
    }

    /// Wait for the next inbound frame and apply it.
    pub async fn process_next_update(&self) {
        let next = self.inbound.lock().await.recv().await;
        if let Some(raw) = next {
            self.handle_update(&raw);
        }
    }

    /// Apply every frame already queued. Returns how many were applied.
    pub async fn drain_updates(&self) -> usize {
        let mut inbound = self.inbound.lock().await;
        let mut applied = 0;
        while let Ok(raw) = inbound.try_recv() {
            self.handle_update(&raw);
            applied += 1;
        }
        applied
    }

    /// Apply inbound frames in the background for as long as the store lives.
    ///
    /// The task only holds a weak reference while it waits, and finishes once
    /// the last `Arc` to the store is dropped.
    pub fn spawn_update_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let inbound = Arc::clone(&self.inbound);
        let mut alive = self.alive.subscribe();

        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    next = async { inbound.lock().await.recv().await } => next,
                    _ = alive.changed() => None,
                };
                let Some(raw) = next else {
                    break;
                };
                let Some(store) = weak.upgrade() else {
                    break;
                };
                store.handle_update(&raw);
            }
            tracing::debug!("Session store dropped, update loop finished");
        })
    }
}

/// Holds the pending-request slot for the lifetime of one lifecycle call.
struct PendingGuard<'a> {
    slot: &'a Mutex<Option<LifecycleRequest>>,
}

impl<'a> PendingGuard<'a> {
    fn claim(
        slot: &'a Mutex<Option<LifecycleRequest>>,
        request: LifecycleRequest,
    ) -> Result<Self, LifecycleError> {
        let mut pending = lock(slot);
        if let Some(current) = *pending {
            tracing::warn!(%request, pending = %current, "Rejecting lifecycle request, another is in progress");
            return Err(LifecycleError::InFlight(current));
        }
        *pending = Some(request);
        Ok(Self { slot })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

fn lock(slot: &Mutex<Option<LifecycleRequest>>) -> MutexGuard<'_, Option<LifecycleRequest>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}
