//! Recipient validation.

use std::fmt;

/// Why a recipient was rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Phone number could not be normalized.
    InvalidPhone,
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidPhone => write!(f, "Invalid phone number"),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validate and normalize an email address (trimmed, lowercased).
///
/// This is a basic format check:
/// - Exactly one @ with text on both sides
/// - At least one dot in the domain, not at either end, never doubled
/// - No whitespace
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail(
            "must not contain whitespace".to_string(),
        ));
    }

    let (local, domain) = match email.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => {
            return Err(ValidationError::InvalidEmail(
                "must contain exactly one @ symbol".to_string(),
            ))
        }
    };

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain an inner dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(email.to_ascii_lowercase())
}

/// Validate and normalize a phone number to E.164.
pub fn normalize_phone(phone: &str) -> Result<String, ValidationError> {
    twilio_client::format_phone_number(phone).ok_or(ValidationError::InvalidPhone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(normalize_email("ana@x.com").unwrap(), "ana@x.com");
        assert_eq!(normalize_email("  Ana.Perez@Example.COM ").unwrap(), "ana.perez@example.com");
    }

    #[test]
    fn test_invalid_emails() {
        for bad in ["", "ana", "ana@", "@x.com", "ana@x", "ana@.x.com", "ana@x..com", "a b@x.com", "a@b@x.com"] {
            assert!(normalize_email(bad).is_err(), "expected {:?} to be rejected", bad);
        }
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            normalize_email(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("305-123-4567").unwrap(), "+13051234567");
        assert_eq!(normalize_phone("123"), Err(ValidationError::InvalidPhone));
    }
}
