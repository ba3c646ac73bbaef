//! Outbox error types.

use thiserror::Error;

/// Outbox error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutboxError {
    /// Request rejected before it was queued
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
