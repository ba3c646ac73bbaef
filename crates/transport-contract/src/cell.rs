//! Slot holding the current transport handle.

use crate::{ConnectionUpdate, MessagePayload, SendReceipt, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// The process-wide current transport handle.
///
/// Delegates to whatever handle was installed last. The health monitor is
/// the only writer; the delivery queue only sends through it.
#[derive(Clone, Default)]
pub struct TransportCell {
    current: Arc<RwLock<Option<Arc<dyn Transport>>>>,
}

impl TransportCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current handle.
    pub fn install(&self, handle: Arc<dyn Transport>) {
        *self.current.write() = Some(handle);
        debug!("Installed new transport handle");
    }

    /// Drop the current handle, if any.
    pub fn clear(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Arc<dyn Transport>> {
        self.current.read().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.current().is_some()
    }
}

#[async_trait]
impl Transport for TransportCell {
    async fn send(
        &self,
        destination: &str,
        payload: &MessagePayload,
    ) -> TransportResult<SendReceipt> {
        // Clone out of the lock before awaiting.
        let handle = self.current().ok_or(TransportError::Unavailable)?;
        handle.send(destination, payload).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate> {
        match self.current() {
            Some(handle) => handle.subscribe(),
            None => {
                // A receiver whose sender is already gone never yields an update.
                let (_tx, rx) = broadcast::channel(1);
                rx
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.current().map(|h| h.is_connected()).unwrap_or(false)
    }
}
