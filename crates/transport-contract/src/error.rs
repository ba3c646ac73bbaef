//! Transport error types.

use thiserror::Error;

/// Errors reported by a transport handle or its bootstrap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No transport handle is installed yet
    #[error("Transport unavailable")]
    Unavailable,

    /// The provider refused the message
    #[error("Send rejected: {0}")]
    Rejected(String),

    /// HTTP-level failure talking to the provider
    #[error("HTTP error: {0}")]
    Http(String),

    /// Bootstrap could not produce a handle
    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Result type alias using TransportError.
pub type TransportResult<T> = Result<T, TransportError>;
