//! Queue item and delivery event types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use transport_contract::{MessagePayload, OutboundMessage, TransportError};

/// Delivery status of a queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Waiting at (or behind) the head of the queue
    Pending,
    /// A delivery attempt is running
    InFlight,
    /// Transport acknowledged the message
    Sent,
    /// Retry limit exhausted
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InFlight => write!(f, "in_flight"),
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A message owned by the delivery queue from enqueue until terminal status.
#[derive(Debug, Clone, Serialize)]
pub struct SendRequest {
    pub id: String,
    pub destination: String,
    pub payload: MessagePayload,
    /// Failed attempts so far.
    pub attempt_count: u32,
    pub status: DeliveryStatus,
    pub enqueued_at: DateTime<Utc>,
}

impl SendRequest {
    pub(crate) fn new(message: OutboundMessage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            destination: message.destination,
            payload: message.payload,
            attempt_count: 0,
            status: DeliveryStatus::Pending,
            enqueued_at: Utc::now(),
        }
    }
}

/// Why a single delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The attempt's time bound elapsed first.
    TimedOut,
    /// The transport returned an error.
    Transport(TransportError),
    /// The send task ended without reporting a result.
    Aborted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut => write!(f, "timed out"),
            Self::Transport(e) => write!(f, "{}", e),
            Self::Aborted => write!(f, "send task aborted"),
        }
    }
}

/// Observability events emitted by the queue.
#[derive(Debug, Clone)]
pub enum DeliveryEvent {
    /// An attempt started for the head item.
    Attempting {
        request_id: String,
        destination: String,
        attempt: u32,
    },
    /// The head item was delivered and removed.
    Sent { request: SendRequest, attempt: u32 },
    /// The attempt failed; the item stays at the head.
    Retrying {
        request_id: String,
        destination: String,
        attempt: u32,
        reason: FailureReason,
    },
    /// Retry limit reached; the item was removed.
    Failed {
        request: SendRequest,
        reason: FailureReason,
    },
}
