//! Errors crossing the HTTP boundary.

/// Errors returned by lobby API requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not the expected JSON shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    SerializeError(String),

    /// The response parsed but a required field was absent or empty
    #[error("Response is missing `{0}`")]
    MissingField(&'static str),
}
