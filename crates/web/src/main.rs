//! Brokerage web server.
//!
//! Serves the public form endpoints, operator messaging, the WhatsApp
//! webhook, and speech synthesis.

use std::sync::Arc;
use std::time::Duration;

use brain_core::Brain;
use chat_brain::ChatBrain;
use crm::{HubspotClient, LeadSink};
use database::{processed_message, Database};
use dispatcher::Dispatcher;
use mailer::{MailerConfig, SmtpMailer};
use relay::{MessageRelay, RelayConfig};
use speech::ElevenLabsClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use twilio_client::{TwilioClient, TwilioConfig};
use verification::TurnstileVerifier;
use web::{AppState, Config};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting web server");

    let mailer = match MailerConfig::from_env().and_then(SmtpMailer::new) {
        Ok(mailer) => Some(Arc::new(mailer)),
        Err(e) => {
            warn!(error = %e, "Email is not configured");
            None
        }
    };

    let twilio = match TwilioConfig::from_env().and_then(TwilioClient::new) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Twilio is not configured");
            None
        }
    };

    let mut builder = Dispatcher::builder();
    if let Some(mailer) = &mailer {
        builder = builder.email(mailer.clone());
    }
    if let Some(twilio) = &twilio {
        builder = builder.sms(twilio.clone());
    }
    let dispatcher = builder.build()?;

    let addr = config.addr;
    let database_url = config.database_url.clone();
    let mut state = AppState::new(config, dispatcher);

    match TurnstileVerifier::from_env() {
        Ok(verifier) => state = state.with_verifier(Arc::new(verifier)),
        Err(e) => warn!(error = %e, "Human verification is not configured; forms will be rejected"),
    }

    match HubspotClient::from_env() {
        Ok(client) => state = state.with_leads(Arc::new(LeadSink::new(client))),
        Err(e) => warn!(error = %e, "CRM is not configured; leads will not be captured"),
    }

    match ElevenLabsClient::from_env() {
        Ok(client) => state = state.with_speech(Arc::new(client)),
        Err(e) => warn!(error = %e, "Speech synthesis is not configured"),
    }

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;
    spawn_dedup_pruning(db.clone());

    match (ChatBrain::from_env(), twilio) {
        (Ok(brain), Some(twilio)) => {
            info!(brain = brain.name(), "Inbound relay enabled");
            let relay = MessageRelay::new(Arc::new(brain), Arc::new(db), twilio, RelayConfig::from_env());
            state = state.with_relay(Arc::new(relay));
        }
        (Err(e), _) => warn!(error = %e, "Inbound relay disabled: brain is not configured"),
        (Ok(_), None) => warn!("Inbound relay disabled: Twilio is not configured"),
    }

    let app = web::app(state);

    info!(addr = %addr, "Web server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drop handled webhook message ids once provider retries can no longer arrive.
fn spawn_dedup_pruning(db: Database) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = processed_message::prune_processed(db.pool(), processed_message::DEFAULT_RETENTION).await {
                warn!(error = %e, "Failed to prune processed message ids");
            }
        }
    });
}
