use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The CRM's identifier for a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContactId(pub String);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which public surface produced the lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    ContactForm,
    AppointmentForm,
    QuoteForm,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::ContactForm => "contact_form",
            LeadSource::AppointmentForm => "appointment_form",
            LeadSource::QuoteForm => "quote_form",
        }
    }
}

/// A prospective customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    /// Unique key in the CRM.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub source: LeadSource,
    /// Extra CRM properties, e.g. `insurance_type`.
    pub custom_fields: BTreeMap<String, String>,
}

impl LeadRecord {
    /// Build a record from a single "full name" field.
    ///
    /// The first whitespace-separated word becomes the first name and the
    /// remainder the last name.
    pub fn from_full_name(email: impl Into<String>, full_name: &str, source: LeadSource) -> Self {
        let mut parts = full_name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");
        Self {
            email: email.into().trim().to_lowercase(),
            first_name,
            last_name,
            phone: None,
            source,
            custom_fields: BTreeMap::new(),
        }
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.custom_fields.insert(key.into(), value);
        }
        self
    }

    /// CRM property map for create/update calls.
    pub(crate) fn properties(&self) -> BTreeMap<String, String> {
        let mut props = self.custom_fields.clone();
        props.insert("email".to_string(), self.email.clone());
        props.insert("firstname".to_string(), self.first_name.clone());
        if !self.last_name.is_empty() {
            props.insert("lastname".to_string(), self.last_name.clone());
        }
        if let Some(phone) = &self.phone {
            props.insert("phone".to_string(), phone.clone());
        }
        props.insert("lead_source".to_string(), self.source.as_str().to_string());
        props
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Outcome of [`crate::LeadSink::upsert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpsert {
    pub contact_id: ContactId,
    pub action: UpsertAction,
    pub note_attached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_split() {
        let record = LeadRecord::from_full_name(" Ana@Example.com ", "Ana María López", LeadSource::QuoteForm);
        assert_eq!(record.email, "ana@example.com");
        assert_eq!(record.first_name, "Ana");
        assert_eq!(record.last_name, "María López");

        let single = LeadRecord::from_full_name("x@example.com", "Cher", LeadSource::ContactForm);
        assert_eq!(single.first_name, "Cher");
        assert!(single.last_name.is_empty());
    }

    #[test]
    fn test_properties_skip_blank_values() {
        let record = LeadRecord::from_full_name("x@example.com", "Cher", LeadSource::AppointmentForm)
            .with_phone(Some("  ".to_string()))
            .with_field("insurance_type", "auto")
            .with_field("zip_code", "");

        let props = record.properties();
        assert_eq!(props.get("insurance_type").map(String::as_str), Some("auto"));
        assert_eq!(props.get("lead_source").map(String::as_str), Some("appointment_form"));
        assert!(!props.contains_key("phone"));
        assert!(!props.contains_key("zip_code"));
        assert!(!props.contains_key("lastname"));
    }
}
