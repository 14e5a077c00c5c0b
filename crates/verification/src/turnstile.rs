//! Turnstile `siteverify` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TurnstileConfig;
use crate::{HumanVerifier, VerificationError};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies tokens with Cloudflare Turnstile.
#[derive(Clone)]
pub struct TurnstileVerifier {
    http: Client,
    config: TurnstileConfig,
}

impl TurnstileVerifier {
    pub fn new(config: TurnstileConfig) -> Result<Self, VerificationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VerificationError::Failed(format!("client build: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, VerificationError> {
        Self::new(TurnstileConfig::from_env()?)
    }
}

#[async_trait]
impl HumanVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<(), VerificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::MissingToken);
        }

        let request = VerifyRequest {
            secret: self.config.secret_key(),
            response: token,
            remoteip: remote_ip,
        };

        let response = self
            .http
            .post(&self.config.verify_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Turnstile request failed");
                VerificationError::Failed("challenge service unreachable".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Turnstile returned non-success status");
            return Err(VerificationError::Failed(format!("HTTP {}", status.as_u16())));
        }

        let body: VerifyResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Turnstile response was not valid JSON");
            VerificationError::Failed("unreadable challenge response".to_string())
        })?;

        if body.success {
            debug!("Turnstile token verified");
            Ok(())
        } else {
            warn!(codes = ?body.error_codes, "Turnstile rejected token");
            Err(VerificationError::Failed(body.error_codes.join(",")))
        }
    }
}

impl std::fmt::Debug for TurnstileVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileVerifier")
            .field("verify_url", &self.config.verify_url)
            .finish()
    }
}
