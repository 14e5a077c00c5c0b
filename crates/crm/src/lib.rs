//! Lead sink for the brokerage CRM.
//!
//! [`LeadSink`] creates or updates a contact keyed by email and then attaches
//! a free-text note. The HTTP details live behind [`CrmApi`] so the upsert
//! logic can be exercised against [`memory::InMemoryCrm`].

mod config;
mod error;
mod hubspot;
pub mod memory;
mod sink;
mod types;

pub use config::{HubspotConfig, DEFAULT_API_URL};
pub use error::CrmError;
pub use hubspot::HubspotClient;
pub use sink::{LeadCapture, LeadSink};
pub use types::{ContactId, LeadRecord, LeadSource, LeadUpsert, UpsertAction};

use async_trait::async_trait;

/// Raw CRM operations used by [`LeadSink`].
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Create a contact. Returns [`CrmError::Conflict`] if one already exists
    /// for the email.
    async fn create_contact(&self, record: &LeadRecord) -> Result<ContactId, CrmError>;

    /// Look up a contact by exact email.
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, CrmError>;

    /// Overwrite the contact's properties with the record's values.
    async fn update_contact(&self, id: &ContactId, record: &LeadRecord) -> Result<(), CrmError>;

    /// Attach a note to a contact.
    async fn create_note(&self, id: &ContactId, body: &str) -> Result<(), CrmError>;
}

#[async_trait]
impl<T: CrmApi + ?Sized> CrmApi for std::sync::Arc<T> {
    async fn create_contact(&self, record: &LeadRecord) -> Result<ContactId, CrmError> {
        (**self).create_contact(record).await
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, CrmError> {
        (**self).find_contact_by_email(email).await
    }

    async fn update_contact(&self, id: &ContactId, record: &LeadRecord) -> Result<(), CrmError> {
        (**self).update_contact(id, record).await
    }

    async fn create_note(&self, id: &ContactId, body: &str) -> Result<(), CrmError> {
        (**self).create_note(id, body).await
    }
}
