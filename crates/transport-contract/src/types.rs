//! Transport traits and the values that cross them.

use crate::TransportResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Message body handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_reference: Option<String>,
}

impl MessagePayload {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            media_reference: None,
        }
    }
}

/// A send request as produced by an ingress adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Opaque recipient identifier.
    pub destination: String,
    pub payload: MessagePayload,
}

impl OutboundMessage {
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            payload: MessagePayload::text(body),
        }
    }

    pub fn with_media(mut self, media_reference: impl Into<String>) -> Self {
        self.payload.media_reference = Some(media_reference.into());
        self
    }
}

/// Acknowledgment returned by a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    #[serde(default)]
    pub message_id: Option<String>,
}

/// `connection.update` event emitted by a transport handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionUpdate {
    Open,
    Close { last_disconnect: Option<String> },
}

/// The external messaging capability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one message. Fails by returning `Err`.
    async fn send(&self, destination: &str, payload: &MessagePayload)
        -> TransportResult<SendReceipt>;

    /// Subscribe to connection open/close events.
    fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate>;

    /// Whether the handle currently believes it is connected.
    fn is_connected(&self) -> bool;
}

/// Creates fresh transport handles. Callable repeatedly; may fail.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn reinitialize(&self) -> TransportResult<Arc<dyn Transport>>;
}
