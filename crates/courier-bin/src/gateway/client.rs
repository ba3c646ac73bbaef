//! Gateway transport handle.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use transport_contract::{
    ConnectionUpdate, MessagePayload, SendReceipt, Transport, TransportError, TransportResult,
};
use url::Url;

/// Request body for `POST /messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    to: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_url: Option<&'a str>,
}

/// Response from `POST /messages`.
#[derive(Debug, Default, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    id: Option<String>,
}

/// One connection to the gateway, live from a successful status check until
/// the first failed one.
pub struct GatewayTransport {
    client: Client,
    messages_url: Url,
    connected: Arc<AtomicBool>,
    updates: broadcast::Sender<ConnectionUpdate>,
    poller: JoinHandle<()>,
}

impl GatewayTransport {
    /// Start a handle whose status check just succeeded.
    pub(crate) fn connect(
        client: Client,
        status_url: Url,
        messages_url: Url,
        poll_interval: Duration,
    ) -> Self {
        let connected = Arc::new(AtomicBool::new(true));
        let (updates, _) = broadcast::channel(16);

        let poller = tokio::spawn(poll_status(
            client.clone(),
            status_url,
            poll_interval,
            connected.clone(),
            updates.clone(),
        ));

        Self {
            client,
            messages_url,
            connected,
            updates,
            poller,
        }
    }
}

impl Drop for GatewayTransport {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

#[async_trait]
impl Transport for GatewayTransport {
    async fn send(
        &self,
        destination: &str,
        payload: &MessagePayload,
    ) -> TransportResult<SendReceipt> {
        let body = SendMessageBody {
            to: destination,
            body: &payload.body,
            media_url: payload.media_reference.as_deref(),
        };

        let response = self
            .client
            .post(self.messages_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(format!("{}: {}", status, text)));
        }

        let parsed = match response.json::<SendMessageResponse>().await {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Gateway accepted message without a readable body");
                SendMessageResponse::default()
            }
        };

        Ok(SendReceipt {
            message_id: parsed.id,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate> {
        self.updates.subscribe()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// `GET {status_url}`; any non-2xx answer counts as unreachable.
pub(crate) async fn check_status(client: &Client, status_url: &Url) -> TransportResult<()> {
    let response = client
        .get(status_url.clone())
        .send()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(TransportError::Http(format!(
            "status endpoint returned {}",
            response.status()
        )))
    }
}

async fn poll_status(
    client: Client,
    status_url: Url,
    interval: Duration,
    connected: Arc<AtomicBool>,
    updates: broadcast::Sender<ConnectionUpdate>,
) {
    let _ = updates.send(ConnectionUpdate::Open);

    loop {
        tokio::time::sleep(interval).await;
        if let Err(e) = check_status(&client, &status_url).await {
            warn!(error = %e, "Gateway status check failed");
            connected.store(false, Ordering::SeqCst);
            let _ = updates.send(ConnectionUpdate::Close {
                last_disconnect: Some(e.to_string()),
            });
            break;
        }
    }
}
