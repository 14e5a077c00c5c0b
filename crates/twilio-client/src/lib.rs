//! Twilio Messages API client.
//!
//! This crate provides a Rust client for sending messages through Twilio:
//!
//! - Sending SMS from the brokerage number
//! - Sending WhatsApp replies from the WhatsApp sender
//! - Normalizing customer phone numbers before dispatch
//!
//! # Example
//!
//! ```no_run
//! use twilio_client::{TwilioClient, TwilioConfig};
//!
//! # async fn example() -> Result<(), twilio_client::TwilioError> {
//! let client = TwilioClient::new(TwilioConfig::from_env()?)?;
//!
//! let result = client.send_sms("+13055550100", "Your appointment is confirmed.").await?;
//! println!("Queued as {}", result.sid);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod phone;
pub mod types;

pub use client::TwilioClient;
pub use config::TwilioConfig;
pub use error::TwilioError;
pub use phone::{format_phone_number, strip_channel_prefix, whatsapp_address, DEFAULT_COUNTRY_CODE};
pub use types::{MessageResource, SendParams};
