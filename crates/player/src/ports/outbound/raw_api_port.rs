//! Raw API Port - Object-safe HTTP boundary
//!
//! Adapters only move JSON values over HTTP. The typed `LobbyApi` wrapper in the
//! application layer owns paths, DTO decoding and response validation.

use serde_json::Value;

use super::ApiError;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RawApiPort: Send + Sync {
    /// GET `path` and return the decoded JSON body of a 2xx response.
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    /// POST `body` as JSON to `path` and return the decoded JSON body of a 2xx response.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}
