//! WebSocket connector for the game service.
//!
//! `desktop` is the tokio-tungstenite implementation. Browser builds are out
//! of scope for this client.

#[cfg(not(target_arch = "wasm32"))]
mod desktop;

#[cfg(not(target_arch = "wasm32"))]
pub use desktop::WsConnector;
