//! Delta Shared - wire types exchanged between the game service and the player client
//!
//! This crate contains:
//! - WebSocket message types (`ClientMessage` directives, `ServerMessage` events)
//! - Lobby REST DTOs used by matchmaking and private rooms
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and thiserror
//! 2. **No business logic** - Pure data types and decoding
//! 3. **Forward compatible** - Unknown event kinds decode to `ServerMessage::Unknown`

pub mod lobby;
pub mod messages;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{
    ClientMessage, ErrorPayload, GameEndedPayload, GameStartedPayload, ProtocolError,
    ServerMessage, WordSubmittedPayload, TIMEOUT_WIN_REASON, UNKNOWN_ERROR_MESSAGE,
};

// =============================================================================
// Lobby REST Types
// =============================================================================
pub use lobby::{
    CreatePrivateGameResponse, FindGameResponse, JoinPrivateGameRequest,
    JoinPrivateGameResponse, CREATE_PRIVATE_GAME_PATH, FIND_GAME_PATH, JOIN_PRIVATE_GAME_PATH,
};
