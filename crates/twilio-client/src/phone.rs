//! Phone number normalization.
//!
//! Numbers are reduced to digits and classified:
//!
//! - 10 digits: a national number under [`DEFAULT_COUNTRY_CODE`]
//! - 11 digits starting with `1`: a national number with its country code
//! - 11 to 15 digits: international, accepted only when it starts with a
//!   prefix from [`INTERNATIONAL_PREFIXES`]
//!
//! Anything else is rejected.

/// Country code assumed for 10-digit numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// Country calling codes accepted for international numbers.
///
pub const INTERNATIONAL_PREFIXES: &[&str] = &[
    "502", "503", "504", "505", "506", "507", "591", "593", "595", "598", "34", "44", "49",
    "51", "52", "53", "54", "55", "56", "57", "58", "33", "39",
];

/// Maximum length of an E.164 number, excluding the `+`.
const MAX_E164_DIGITS: usize = 15;

/// Normalize a phone number to E.164 (`+<digits>`).
///
/// Returns `None` for anything that is not a recognized number. Never panics.
pub fn format_phone_number(raw: &str) -> Option<String> {
    let digits: String = strip_channel_prefix(raw)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    match digits.len() {
        10 => Some(format!("+{}{}", DEFAULT_COUNTRY_CODE, digits)),
        11 if digits.starts_with(DEFAULT_COUNTRY_CODE) => Some(format!("+{}", digits)),
        11..=MAX_E164_DIGITS
            if INTERNATIONAL_PREFIXES
                .iter()
                .any(|prefix| digits.starts_with(prefix)) =>
        {
            Some(format!("+{}", digits))
        }
        _ => None,
    }
}

/// Remove a `whatsapp:` (or `sms:`) channel prefix, if present.
pub fn strip_channel_prefix(address: &str) -> &str {
    let trimmed = address.trim();
    trimmed
        .strip_prefix("whatsapp:")
        .or_else(|| trimmed.strip_prefix("sms:"))
        .unwrap_or(trimmed)
}

/// Build the WhatsApp channel address for a number.
pub fn whatsapp_address(number: &str) -> String {
    format!("whatsapp:{}", strip_channel_prefix(number))
}
