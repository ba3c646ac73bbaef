//! Shared state handed to the ingress handlers.

use delivery_outbox::DeliveryQueue;
use std::sync::Arc;
use std::time::{Duration, Instant};
use transport_health_monitor::HealthMonitor;

/// Shared application state, passed to handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    queue: Arc<DeliveryQueue>,
    monitor: HealthMonitor,
    started_at: Instant,
}

impl AppState {
    pub fn new(queue: Arc<DeliveryQueue>, monitor: HealthMonitor) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                queue,
                monitor,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.inner.queue
    }

    pub fn monitor(&self) -> &HealthMonitor {
        &self.inner.monitor
    }

    /// Time since the daemon started.
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}
