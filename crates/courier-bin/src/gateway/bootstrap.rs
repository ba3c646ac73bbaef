//! Creates gateway transport handles.

use super::client::{check_status, GatewayTransport};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use transport_contract::{Bootstrap, Transport, TransportError, TransportResult};
use url::Url;

/// Gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL; `status` and `messages` are resolved against it.
    pub base_url: Url,
    /// How often a live handle re-checks the status endpoint.
    pub status_poll_interval: Duration,
    /// HTTP client timeout for every gateway request.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            status_poll_interval: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// `Bootstrap` over the HTTP gateway.
pub struct GatewayBootstrap {
    client: Client,
    status_url: Url,
    messages_url: Url,
    poll_interval: Duration,
}

impl GatewayBootstrap {
    pub fn new(config: GatewayConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Bootstrap(e.to_string()))?;

        Ok(Self {
            client,
            status_url: endpoint(&config.base_url, "status")?,
            messages_url: endpoint(&config.base_url, "messages")?,
            poll_interval: config.status_poll_interval,
        })
    }
}

fn endpoint(base: &Url, path: &str) -> TransportResult<Url> {
    base.join(path)
        .map_err(|e| TransportError::Bootstrap(format!("invalid gateway URL: {}", e)))
}

#[async_trait]
impl Bootstrap for GatewayBootstrap {
    async fn reinitialize(&self) -> TransportResult<Arc<dyn Transport>> {
        debug!(url = %self.status_url, "Checking gateway");
        check_status(&self.client, &self.status_url)
            .await
            .map_err(|e| TransportError::Bootstrap(e.to_string()))?;

        info!(url = %self.status_url, "Gateway reachable");
        Ok(Arc::new(GatewayTransport::connect(
            self.client.clone(),
            self.status_url.clone(),
            self.messages_url.clone(),
            self.poll_interval,
        )))
    }
}
