//! Contract between the delivery core and the external messaging transport.
//!
//! This crate provides:
//! - `Transport`: the opaque send capability plus its connection events
//! - `Bootstrap`: the collaborator that (re)creates transport handles
//! - `TransportCell`: the slot holding the current handle, shared by the
//!   delivery queue and the health monitor

mod cell;
mod error;
mod types;

pub use cell::TransportCell;
pub use error::{TransportError, TransportResult};
pub use types::{Bootstrap, ConnectionUpdate, MessagePayload, OutboundMessage, SendReceipt, Transport};
