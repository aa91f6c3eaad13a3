//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the game session store to talk to the lobby API and the game
//! service socket without depending on concrete implementations.

pub mod api_port;
pub mod clock_port;
pub mod raw_api_port;
pub mod socket_port;

pub use api_port::ApiError;
pub use clock_port::ClockPort;
pub use raw_api_port::RawApiPort;
pub use socket_port::{ConnectionState, InboundSink, SocketConnector, SocketHandle, TransportError};

#[cfg(test)]
pub use clock_port::MockClockPort;
#[cfg(test)]
pub use raw_api_port::MockRawApiPort;
