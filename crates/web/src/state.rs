//! Application state shared across handlers.

use std::sync::Arc;

use crm::LeadCapture;
use dispatcher::Dispatcher;
use relay::MessageRelay;
use speech::SpeechSynthesizer;
use verification::HumanVerifier;

use crate::config::Config;

/// Shared application state. Providers are `None` when unconfigured.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Option<Arc<dyn HumanVerifier>>,
    pub dispatcher: Arc<Dispatcher>,
    pub leads: Option<Arc<dyn LeadCapture>>,
    pub relay: Option<Arc<MessageRelay>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
}

impl AppState {
    /// State with only a dispatcher; attach the rest with the `with_*` methods.
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            verifier: None,
            dispatcher: Arc::new(dispatcher),
            leads: None,
            relay: None,
            speech: None,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn HumanVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_leads(mut self, leads: Arc<dyn LeadCapture>) -> Self {
        self.leads = Some(leads);
        self
    }

    pub fn with_relay(mut self, relay: Arc<MessageRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }
}
