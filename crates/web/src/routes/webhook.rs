//! Inbound WhatsApp webhook.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use relay::{RelayOutcome, WebhookForm, WebhookPayload};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: RelayOutcome,
}

/// Static identification payload for provider console checks.
pub async fn webhook_status() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "service": "whatsapp-webhook",
        "status": "ready",
    }))
}

/// Relay one inbound message.
///
/// Answers 200 for every handled delivery, including ignored and duplicate
/// ones. Failures answer 500 with a generic body.
pub async fn receive(
    State(state): State<AppState>,
    payload: std::result::Result<Form<WebhookForm>, FormRejection>,
) -> Response {
    let form = match payload {
        Ok(Form(form)) => form,
        Err(e) => {
            warn!(error = %e, "Unreadable webhook body");
            WebhookForm::default()
        }
    };

    let Some(relay) = state.relay.as_ref() else {
        error!("Inbound relay is not configured");
        return internal_error();
    };

    match relay.handle(WebhookPayload::parse(form)).await {
        Ok(outcome) => (StatusCode::OK, Json(WebhookAck { success: true, outcome })).into_response(),
        Err(e) => {
            error!(error = %e, "Webhook processing failed");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Internal server error",
        })),
    )
        .into_response()
}
