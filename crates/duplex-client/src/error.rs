//! Error types for control-plane calls.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the control plane.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The control plane answered with a non-2xx status.
    #[error("API error {status} from {endpoint}: {body}")]
    Api {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid client config: {0}")]
    InvalidConfig(String),
}
