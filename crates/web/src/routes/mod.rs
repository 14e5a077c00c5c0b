//! Route handlers.

pub mod forms;
pub mod health;
pub mod messages;
pub mod speech;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Public forms
        .route("/api/contact", post(forms::contact))
        .route("/api/appointment", post(forms::appointment))
        .route("/api/quote", post(forms::quote))
        // Operator messaging
        .route("/api/messages", post(messages::send_messages))
        // Inbound relay
        .route(
            "/api/whatsapp/webhook",
            get(webhook::webhook_status).post(webhook::receive),
        )
        .route("/api/speech", post(speech::synthesize))
}
