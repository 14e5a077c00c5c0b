//! API errors.
//!
//! Every error renders as `{success: false, message}` with a message in the
//! request's language. Provider detail is logged here and never serialized.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatcher::Locale;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input; nothing was attempted.
    #[error("bad request: {detail}")]
    BadRequest { locale: Locale, detail: String },

    /// Human verification rejected or could not be completed.
    #[error("verification failed: {detail}")]
    VerificationFailed { locale: Locale, detail: String },

    /// A primary downstream call failed.
    #[error("provider error: {detail}")]
    Provider { locale: Locale, detail: String },

    /// A provider the endpoint needs is not configured.
    #[error("{component} is not configured")]
    Configuration { locale: Locale, component: &'static str },

    #[error("unauthorized")]
    Unauthorized,
}

impl ApiError {
    pub fn bad_request(locale: Locale, detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            locale,
            detail: detail.into(),
        }
    }

    pub fn verification(locale: Locale, detail: impl ToString) -> Self {
        ApiError::VerificationFailed {
            locale,
            detail: detail.to_string(),
        }
    }

    pub fn provider(locale: Locale, detail: impl ToString) -> Self {
        ApiError::Provider {
            locale,
            detail: detail.to_string(),
        }
    }

    pub fn unconfigured(locale: Locale, component: &'static str) -> Self {
        ApiError::Configuration { locale, component }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::VerificationFailed { .. } => StatusCode::BAD_REQUEST,
            ApiError::Provider { .. } | ApiError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest { locale, .. } => locale.pick(
                "Please complete all required fields with valid information.",
                "Por favor completa todos los campos obligatorios con información válida.",
            ),
            ApiError::VerificationFailed { locale, .. } => locale.pick(
                "We could not verify your submission. Please try again.",
                "No pudimos verificar tu envío. Por favor intenta de nuevo.",
            ),
            ApiError::Provider { locale, .. } | ApiError::Configuration { locale, .. } => locale.pick(
                "We could not process your request right now. Please try again later.",
                "No pudimos procesar tu solicitud en este momento. Por favor intenta más tarde.",
            ),
            ApiError::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest { detail, .. } => warn!("Rejected request: {}", detail),
            ApiError::VerificationFailed { detail, .. } => warn!("Verification failed: {}", detail),
            ApiError::Provider { detail, .. } => error!("Provider error: {}", detail),
            ApiError::Configuration { component, .. } => error!("{} is not configured", component),
            ApiError::Unauthorized => warn!("Unauthorized request"),
        }

        let body = json!({
            "success": false,
            "message": self.message(),
        });

        (self.status(), Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request(Locale::En, "name").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::verification(Locale::En, "x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::provider(Locale::En, "x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::unconfigured(Locale::En, "email").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_messages_follow_locale_and_hide_detail() {
        let es = ApiError::provider(Locale::Es, "smtp 535 bad credentials for user@x");
        assert!(es.message().starts_with("No pudimos"));
        assert!(!es.message().contains("smtp"));

        let en = ApiError::verification(Locale::En, "timeout-or-duplicate");
        assert!(en.message().starts_with("We could not verify"));
    }
}
