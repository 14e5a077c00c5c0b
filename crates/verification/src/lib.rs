//! Human-verification gate.
//!
//! Every public form submission carries a Turnstile token. The gate checks
//! it against Cloudflare's `siteverify` endpoint before anything with side
//! effects runs. It fails closed: a missing token, a transport error, a
//! non-success HTTP status, or an unparseable body all count as "not
//! verified". There is no caching and no retry.

mod config;
mod turnstile;

pub use config::{TurnstileConfig, DEFAULT_VERIFY_URL};
pub use turnstile::TurnstileVerifier;

use async_trait::async_trait;
use thiserror::Error;

/// Why a submission was not verified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// The token was empty or absent; no network call was made.
    #[error("verification token is missing")]
    MissingToken,

    /// The challenge service rejected the token or could not be consulted.
    #[error("verification failed: {0}")]
    Failed(String),

    /// Missing required environment variable.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// A human-verification check.
#[async_trait]
pub trait HumanVerifier: Send + Sync {
    /// Verify `token`. `remote_ip` is forwarded when known.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<(), VerificationError>;
}
