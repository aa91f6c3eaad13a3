pub mod clock;
pub mod http_client;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::SystemClock;
pub use http_client::HttpApiAdapter;
#[cfg(not(target_arch = "wasm32"))]
pub use websocket::WsConnector;
