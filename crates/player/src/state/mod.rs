//! Client-side game state.
//!
//! `game_state` holds the single tracked `GameSession` and the pure transition
//! rules driven by server events. It has no I/O; the session store owns an
//! instance and decides when to apply events.

pub mod game_state;

pub use game_state::{GameKind, GameSession, GameStatus, InvalidTransition, Outcome, Player, Turn};
