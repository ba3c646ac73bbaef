//! HTTP ingress.
//!
//! # Endpoints
//!
//! - `POST /send-message` - Enqueue a message (`{number, message, mediaUrl?}`)
//! - `GET /health` - Connection status, uptime and reconnect attempts
//! - `GET /restart` - Manually restart the transport connection

mod health;
mod restart;
mod send_message;

pub use health::health_handler;
pub use restart::restart_handler;
pub use send_message::send_message_handler;

use crate::app::AppState;

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/send-message", post(send_message_handler))
        .route("/health", get(health_handler))
        .route("/restart", get(restart_handler))
        .with_state(app_state)
}
