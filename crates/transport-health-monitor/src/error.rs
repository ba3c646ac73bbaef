//! Monitor error types.

use thiserror::Error;

/// Monitor error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// The monitor task is no longer running
    #[error("Health monitor stopped")]
    Stopped,
}

/// Result type alias using MonitorError.
pub type MonitorResult<T> = Result<T, MonitorError>;
