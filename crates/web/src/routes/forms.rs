//! Public form endpoints: contact, appointment, quote.
//!
//! Each handler validates required fields, verifies the submitter is human,
//! then sends one internal notification and one confirmation. Appointment
//! and quote requests also upsert a CRM lead first; a CRM failure never
//! blocks the notifications.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use crm::{LeadRecord, LeadSource};
use dispatcher::validation::{normalize_email, normalize_phone};
use dispatcher::{DispatchError, Locale, NotificationRequest, TemplateKind};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::directory::route_appointment;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
    pub turnstile_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub appointment_type: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    /// Specialist slug from a booking link.
    pub agent: Option<String>,
    pub language: Option<String>,
    pub turnstile_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub insurance_type: Option<String>,
    pub zip_code: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
    pub turnstile_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: String,
}

impl FormResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }
}

/// Contact form.
pub async fn contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<FormResponse>> {
    let Json(form) = payload.map_err(|e| ApiError::bad_request(Locale::En, e.body_text()))?;
    let locale = locale_of(form.language.as_deref());

    let name = required(locale, "name", form.name.as_deref())?;
    let email = required_email(locale, form.email.as_deref())?;
    let message = required(locale, "message", form.message.as_deref())?;
    let subject = optional(form.subject.as_deref())
        .unwrap_or_else(|| locale.pick("General Inquiry", "Consulta general").to_string());
    let phone = display_phone(form.phone.as_deref());

    verify(&state, locale, &headers, form.turnstile_token.as_deref()).await?;

    let brokerage = &state.config.brokerage;

    let internal = NotificationRequest::email(&brokerage.contact_inbox, TemplateKind::ContactInternal, locale)
        .with("name", &name)
        .with("email", &email)
        .with_opt("phone", phone.as_deref())
        .with("subject", &subject)
        .with("message", &message)
        .with_reply_to(&email);
    deliver(&state, locale, &internal).await?;

    let confirmation = NotificationRequest::email(&email, TemplateKind::ContactConfirmation, locale)
        .with("name", &name)
        .with_opt("brokerage_name", Some(brokerage.name.as_str()))
        .with_reply_to(&brokerage.contact_inbox);
    deliver(&state, locale, &confirmation).await?;

    info!(email = %email, locale = locale.code(), "Contact form handled");

    Ok(FormResponse::ok(locale.pick(
        "Your message has been received. We will contact you shortly.",
        "Tu mensaje ha sido recibido. Nos pondremos en contacto contigo pronto.",
    )))
}

/// Appointment request form, with specialist routing.
pub async fn appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<AppointmentForm>, JsonRejection>,
) -> Result<Json<FormResponse>> {
    let Json(form) = payload.map_err(|e| ApiError::bad_request(Locale::En, e.body_text()))?;
    let locale = locale_of(form.language.as_deref());

    let name = required(locale, "name", form.name.as_deref())?;
    let email = required_email(locale, form.email.as_deref())?;
    let appointment_type = required(locale, "appointmentType", form.appointment_type.as_deref())?;
    let preferred_date = required(locale, "preferredDate", form.preferred_date.as_deref())?;
    let preferred_time = required(locale, "preferredTime", form.preferred_time.as_deref())?;
    let message = optional(form.message.as_deref());
    let phone = display_phone(form.phone.as_deref());

    verify(&state, locale, &headers, form.turnstile_token.as_deref()).await?;

    let brokerage = &state.config.brokerage;
    let route = route_appointment(brokerage, form.agent.as_deref(), &appointment_type);
    let agent_name = route.specialist.map(|s| s.name);

    let record = LeadRecord::from_full_name(&email, &name, LeadSource::AppointmentForm)
        .with_phone(phone.clone())
        .with_field("appointment_type", &appointment_type)
        .with_field("preferred_language", locale.code());
    let mut note = format!(
        "Appointment request for {}\nType: {}\nPreferred: {} {}\nLanguage: {}",
        route.addressee,
        appointment_type,
        preferred_date,
        preferred_time,
        locale.code()
    );
    if let Some(message) = &message {
        note.push_str("\n\n");
        note.push_str(message);
    }
    capture_lead(&state, &record, &note).await;

    let mut internal = NotificationRequest::email(&route.recipient, TemplateKind::AppointmentInternal, locale)
        .with("name", &name)
        .with("email", &email)
        .with_opt("phone", phone.as_deref())
        .with("appointment_type", &appointment_type)
        .with("preferred_date", &preferred_date)
        .with("preferred_time", &preferred_time)
        .with_opt("message", message.as_deref())
        .with_opt("agent_name", agent_name)
        .with_reply_to(&email);
    if let Some(cc) = &route.cc {
        internal = internal.with_cc(cc);
    }
    deliver(&state, locale, &internal).await?;

    let confirmation = NotificationRequest::email(&email, TemplateKind::AppointmentConfirmation, locale)
        .with("name", &name)
        .with("preferred_date", &preferred_date)
        .with("preferred_time", &preferred_time)
        .with_opt("agent_name", agent_name)
        .with_opt("brokerage_name", Some(brokerage.name.as_str()))
        .with_reply_to(&route.recipient);
    deliver(&state, locale, &confirmation).await?;

    info!(email = %email, recipient = %route.recipient, "Appointment request handled");

    Ok(FormResponse::ok(locale.pick(
        "Your appointment request has been received. We will contact you to confirm it.",
        "Tu solicitud de cita ha sido recibida. Te contactaremos para confirmarla.",
    )))
}

/// Quote request form.
pub async fn quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<QuoteForm>, JsonRejection>,
) -> Result<Json<FormResponse>> {
    let Json(form) = payload.map_err(|e| ApiError::bad_request(Locale::En, e.body_text()))?;
    let locale = locale_of(form.language.as_deref());

    let name = required(locale, "name", form.name.as_deref())?;
    let email = required_email(locale, form.email.as_deref())?;
    let insurance_type = required(locale, "insuranceType", form.insurance_type.as_deref())?;
    let zip_code = optional(form.zip_code.as_deref());
    let message = optional(form.message.as_deref());
    let phone = display_phone(form.phone.as_deref());

    verify(&state, locale, &headers, form.turnstile_token.as_deref()).await?;

    let brokerage = &state.config.brokerage;

    let mut record = LeadRecord::from_full_name(&email, &name, LeadSource::QuoteForm)
        .with_phone(phone.clone())
        .with_field("insurance_type", &insurance_type)
        .with_field("preferred_language", locale.code());
    if let Some(zip) = &zip_code {
        record = record.with_field("zip", zip);
    }
    let note = match &message {
        Some(details) => format!("Quote request: {}\n\n{}", insurance_type, details),
        None => format!("Quote request: {}", insurance_type),
    };
    capture_lead(&state, &record, &note).await;

    let internal = NotificationRequest::email(&brokerage.quote_inbox, TemplateKind::QuoteInternal, locale)
        .with("name", &name)
        .with("email", &email)
        .with_opt("phone", phone.as_deref())
        .with("insurance_type", &insurance_type)
        .with_opt("zip_code", zip_code.as_deref())
        .with_opt("message", message.as_deref())
        .with_reply_to(&email);
    deliver(&state, locale, &internal).await?;

    let confirmation = NotificationRequest::email(&email, TemplateKind::QuoteConfirmation, locale)
        .with("name", &name)
        .with("insurance_type", &insurance_type)
        .with_opt("brokerage_name", Some(brokerage.name.as_str()))
        .with_reply_to(&brokerage.quote_inbox);
    deliver(&state, locale, &confirmation).await?;

    info!(email = %email, insurance_type = %insurance_type, "Quote request handled");

    Ok(FormResponse::ok(locale.pick(
        "Your quote request has been received. We will send you a proposal soon.",
        "Tu solicitud de cotización ha sido recibida. Te enviaremos una propuesta pronto.",
    )))
}

pub(crate) fn locale_of(language: Option<&str>) -> Locale {
    language.map(Locale::from_code).unwrap_or_default()
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub(crate) fn required(locale: Locale, field: &'static str, value: Option<&str>) -> Result<String> {
    optional(value).ok_or_else(|| ApiError::bad_request(locale, format!("missing field {}", field)))
}

fn required_email(locale: Locale, value: Option<&str>) -> Result<String> {
    let raw = required(locale, "email", value)?;
    normalize_email(&raw).map_err(|e| ApiError::bad_request(locale, e.to_string()))
}

/// Normalized phone when recognizable, otherwise the trimmed input.
fn display_phone(value: Option<&str>) -> Option<String> {
    let raw = optional(value)?;
    Some(normalize_phone(&raw).unwrap_or(raw))
}

/// First hop client address, as reported by the edge proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .map(str::to_string)
}

async fn verify(state: &AppState, locale: Locale, headers: &HeaderMap, token: Option<&str>) -> Result<()> {
    let verifier = state
        .verifier
        .as_ref()
        .ok_or_else(|| ApiError::unconfigured(locale, "human verification"))?;

    verifier
        .verify(token.unwrap_or_default(), client_ip(headers).as_deref())
        .await
        .map_err(|e| ApiError::verification(locale, e))
}

/// Send a single-recipient notification; anything short of delivery is an error.
async fn deliver(state: &AppState, locale: Locale, request: &NotificationRequest) -> Result<()> {
    let report = state.dispatcher.send(request).await.map_err(|e| match e {
        DispatchError::ChannelUnavailable(channel) => ApiError::unconfigured(locale, channel),
        other => ApiError::provider(locale, other),
    })?;

    if report.all_delivered() {
        Ok(())
    } else {
        Err(ApiError::provider(
            locale,
            format!("{} of {} deliveries failed", report.failed, report.total),
        ))
    }
}

/// Upsert a lead. Never blocks the notifications; failures are only logged.
async fn capture_lead(state: &AppState, record: &LeadRecord, note: &str) {
    let Some(leads) = state.leads.as_ref() else {
        warn!("CRM is not configured, skipping lead capture");
        return;
    };

    match leads.upsert_lead(record, Some(note)).await {
        Ok(upsert) => info!(
            email = %record.email,
            contact_id = %upsert.contact_id.0,
            action = ?upsert.action,
            note_attached = upsert.note_attached,
            "Lead captured"
        ),
        Err(e) => warn!(email = %record.email, error = %e, "Lead capture failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_locale_fallback() {
        assert_eq!(locale_of(None), Locale::En);
        assert_eq!(locale_of(Some("es")), Locale::Es);
        assert_eq!(locale_of(Some("fr")), Locale::En);
    }

    #[test]
    fn test_client_ip_prefers_edge_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.2"));

        assert!(client_ip(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_display_phone() {
        assert_eq!(display_phone(Some("(305) 123-4567")).as_deref(), Some("+13051234567"));
        assert_eq!(display_phone(Some("ext. 12")).as_deref(), Some("ext. 12"));
        assert!(display_phone(Some("  ")).is_none());
    }
}
