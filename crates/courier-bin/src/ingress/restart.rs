//! `GET /restart`: manual transport restart.

use super::send_message::ErrorResponse;
use crate::app::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

/// Ask the monitor to restart and answer without waiting for it.
pub async fn restart_handler(State(state): State<AppState>) -> Response {
    match state.monitor().restart() {
        Ok(()) => {
            info!("Restart requested over HTTP");
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Restart request failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}
