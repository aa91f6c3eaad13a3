//! Application layer: the game session store and the services it drives.
//!
//! - `api`: typed lobby API on top of the raw HTTP port
//! - `transport`: the single channel to the game service
//! - `game_store`: session lifecycle, outbound directives, inbound dispatch

pub mod api;
pub mod game_store;
pub mod transport;

pub use api::{CreatedGame, FoundGame, JoinedRoom, LobbyApi};
pub use game_store::{GameSessionStore, LifecycleError, LifecycleRequest};
pub use transport::TransportChannel;
