//! In-memory adapters and fixtures for tests.
//!
//! Compiled for unit tests and, behind the `testing` feature, for the
//! integration tests under `tests/`.

pub mod fixtures;
mod in_memory_socket;
mod scripted_api;

pub use fixtures::FixedClock;
pub use in_memory_socket::InMemoryConnector;
pub use scripted_api::{ApiCall, ApiGate, ScriptedApi};
