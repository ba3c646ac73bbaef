//! `GET /health`: connection status report.

use crate::app::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use transport_health_monitor::HealthStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Seconds since the daemon started.
    pub uptime: u64,
    pub reconnect_attempts: u32,
    /// RFC 3339.
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = state.monitor().health();
    Json(HealthResponse {
        status: health.status,
        uptime: state.uptime().as_secs(),
        reconnect_attempts: health.reconnect_attempts,
        timestamp: Utc::now().to_rfc3339(),
    })
}
