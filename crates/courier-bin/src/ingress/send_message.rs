//! `POST /send-message`: accept a message for delivery.

use crate::app::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use transport_contract::OutboundMessage;

/// Request body. Every field is optional on the wire so a missing `number`
/// gets our own 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    /// Queue length right after the append.
    pub in_queue: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Enqueue and answer immediately. The response never reflects delivery.
pub async fn send_message_handler(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    let Some(number) = request.number.filter(|n| !n.trim().is_empty()) else {
        debug!("Rejected send request without number");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("number is required")),
        )
            .into_response();
    };

    let mut message = OutboundMessage::new(number, request.message);
    if let Some(media_url) = request.media_url {
        message = message.with_media(media_url);
    }

    match state.queue().enqueue(message) {
        Ok(receipt) => Json(SendMessageResponse {
            success: true,
            in_queue: receipt.in_queue,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Enqueue rejected");
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}
