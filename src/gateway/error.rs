//! Gateway error types

use thiserror::Error;

/// How a gateway call failed, as far as the transport can tell.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The service reports the entity absent.
    #[error("not found")]
    NotFound,

    /// The credential was missing or rejected (401/403).
    #[error("unauthorized")]
    Unauthorized,

    /// The service understood the request and refused it.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Transport-level failure (connect, timeout, malformed body, 5xx).
    #[error("network: {0}")]
    Network(String),
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}
