//! Delta player client.
//!
//! Tracks one word-game session, drives it through matchmaking or a private
//! room, and keeps it in sync with the game service over a WebSocket.
//!
//! - `state`: the session model and its transitions
//! - `application`: lobby API, transport channel and the session store
//! - `ports`: boundaries to HTTP, sockets and time
//! - `infrastructure`: reqwest / tokio-tungstenite adapters and test doubles

pub mod application;
pub mod composition;
pub mod config;
pub mod infrastructure;
pub mod logging;
pub mod ports;
pub mod state;

pub use application::{GameSessionStore, LifecycleError, LifecycleRequest};
pub use config::ClientConfig;
pub use state::{GameKind, GameSession, GameStatus, Outcome, Player, Turn};
