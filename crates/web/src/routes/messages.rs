//! Operator messaging: single or bulk SMS.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatcher::validation::normalize_phone;
use dispatcher::{Channel, DispatchError, Locale, NotificationRequest, RecipientResult, TemplateKind};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::routes::forms::required;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRequest {
    /// Recipient of a single send.
    pub to: Option<String>,
    /// Message text; `{{ key }}` placeholders are filled from `variables`.
    pub message: Option<String>,
    pub bulk: bool,
    pub recipients: Vec<String>,
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSendResponse {
    pub success: bool,
    pub message_sid: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct BulkSendResponse {
    pub success: bool,
    pub bulk: bool,
    pub results: Vec<RecipientResult>,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Send one SMS, or one SMS per recipient when `bulk` is set.
///
/// A partially failed bulk send still answers `success: true`; per-recipient
/// detail is in `results`.
pub async fn send_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Response> {
    authorize(&state, &headers)?;

    let locale = Locale::En;
    let Json(request) = payload.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;
    let message = required(locale, "message", request.message.as_deref())?;
    let template = TemplateKind::Custom(message);

    if request.bulk {
        if request.recipients.is_empty() {
            return Err(ApiError::bad_request(locale, "bulk send without recipients"));
        }

        let notification = NotificationRequest::new(Channel::Sms, request.recipients, template, locale)
            .with_all(request.variables);
        let report = state
            .dispatcher
            .send(&notification)
            .await
            .map_err(|e| dispatch_error(locale, e))?;

        info!(total = report.total, sent = report.sent, failed = report.failed, "Bulk SMS sent");

        return Ok(Json(BulkSendResponse {
            success: true,
            bulk: true,
            total: report.total,
            sent: report.sent,
            failed: report.failed,
            results: report.results,
        })
        .into_response());
    }

    let to = required(locale, "to", request.to.as_deref())?;
    let number = normalize_phone(&to).map_err(|_| ApiError::bad_request(locale, format!("invalid phone number {}", to)))?;

    let notification = NotificationRequest::sms(&number, template, locale).with_all(request.variables);
    let report = state
        .dispatcher
        .send(&notification)
        .await
        .map_err(|e| dispatch_error(locale, e))?;

    let message_sid = match report.first_message_id() {
        Some(sid) if report.all_delivered() => sid.to_string(),
        _ => return Err(ApiError::provider(locale, format!("SMS to {} was not delivered", number))),
    };

    info!(to = %number, message_sid = %message_sid, "SMS sent");

    Ok(Json(SingleSendResponse {
        success: true,
        message_sid,
        to: number,
    })
    .into_response())
}

/// Template problems are the caller's fault; everything else is ours.
fn dispatch_error(locale: Locale, err: DispatchError) -> ApiError {
    match err {
        DispatchError::Template(e) => ApiError::bad_request(locale, format!("message template: {}", e)),
        DispatchError::ChannelUnavailable(channel) => ApiError::unconfigured(locale, channel),
        other => ApiError::provider(locale, other),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.config.messaging_token.as_ref() else {
        return Err(ApiError::unconfigured(Locale::En, "messaging API token"));
    };

    let Some(value) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(ApiError::Unauthorized);
    };

    let Ok(value) = value.to_str() else {
        return Err(ApiError::Unauthorized);
    };

    let Some(token) = value.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized);
    };

    if !bool::from(token.as_bytes().ct_eq(expected.expose_secret().as_bytes())) {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}
