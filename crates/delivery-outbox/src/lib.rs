//! Single-flight delivery queue for outbound messages.
//!
//! This crate provides:
//! - DeliveryQueue: FIFO queue with one delivery attempt in flight at a time
//! - Per-attempt timeout raced against the transport's answer
//! - Bounded retry with head-of-line ordering
//!
//! The queue is in-memory only; anything still queued is lost on restart.

mod error;
mod queue;
mod request;

pub use error::{OutboxError, OutboxResult};
pub use queue::{DeliveryConfig, DeliveryQueue, EnqueueReceipt};
pub use request::{DeliveryEvent, DeliveryStatus, FailureReason, SendRequest};
