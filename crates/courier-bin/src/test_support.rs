//! Fakes shared by the daemon's tests.

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use transport_contract::{
    Bootstrap, ConnectionUpdate, MessagePayload, SendReceipt, Transport, TransportError,
    TransportResult,
};
use url::Url;

#[derive(Clone, Default)]
struct GatewayState {
    healthy: Arc<AtomicBool>,
    received: Arc<Mutex<Vec<Value>>>,
}

/// In-process HTTP gateway on an ephemeral port.
pub struct FakeGateway {
    addr: SocketAddr,
    state: GatewayState,
    server: JoinHandle<()>,
}

impl FakeGateway {
    /// Messages to this destination are answered with 422.
    pub const REJECTED_DESTINATION: &'static str = "blocked";

    pub async fn start() -> Self {
        let state = GatewayState::default();
        state.healthy.store(true, Ordering::SeqCst);

        let app = Router::new()
            .route("/status", get(status))
            .route("/messages", post(messages))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}/{}", self.addr, path)).unwrap()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }
}

impl Drop for FakeGateway {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn status(State(state): State<GatewayState>) -> StatusCode {
    if state.healthy.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn messages(
    State(state): State<GatewayState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let rejected = body["to"] == FakeGateway::REJECTED_DESTINATION;
    state.received.lock().unwrap().push(body);
    if rejected {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "recipient blocked" })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "id": "msg-1" })))
    }
}

/// Connected transport that records every send.
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, MessagePayload)>>,
    updates: broadcast::Sender<ConnectionUpdate>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        let (updates, _) = broadcast::channel(8);
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            updates,
        })
    }

    pub fn sent(&self) -> Vec<(String, MessagePayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        destination: &str,
        payload: &MessagePayload,
    ) -> TransportResult<SendReceipt> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), payload.clone()));
        Ok(SendReceipt::default())
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate> {
        self.updates.subscribe()
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Hands out `RecordingTransport`s, or fails every call when `healthy` is off.
pub struct FakeBootstrap {
    healthy: AtomicBool,
    calls: AtomicUsize,
}

impl FakeBootstrap {
    pub fn new(healthy: bool) -> Arc<Self> {
        Arc::new(Self {
            healthy: AtomicBool::new(healthy),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bootstrap for FakeBootstrap {
    async fn reinitialize(&self) -> TransportResult<Arc<dyn Transport>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(RecordingTransport::new())
        } else {
            Err(TransportError::Bootstrap("gateway down".to_string()))
        }
    }
}
