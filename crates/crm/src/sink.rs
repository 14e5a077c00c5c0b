//! Create-or-update lead flow.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::types::{LeadRecord, LeadUpsert, UpsertAction};
use crate::{CrmApi, CrmError};

/// Lead capture as seen by the form endpoints.
#[async_trait]
pub trait LeadCapture: Send + Sync {
    async fn upsert_lead(&self, record: &LeadRecord, note: Option<&str>) -> Result<LeadUpsert, CrmError>;
}

/// Idempotent contact upsert keyed by email.
///
/// Tries to create first. A conflict means the contact exists, so it is
/// looked up and overwritten with the submitted values. Any other create
/// failure is returned as-is. Note failures never fail the upsert.
#[derive(Debug, Clone)]
pub struct LeadSink<A> {
    api: A,
}

impl<A: CrmApi> LeadSink<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn upsert(&self, record: &LeadRecord, note: Option<&str>) -> Result<LeadUpsert, CrmError> {
        let (contact_id, action) = match self.api.create_contact(record).await {
            Ok(id) => (id, UpsertAction::Created),
            Err(CrmError::Conflict) => {
                let id = self
                    .api
                    .find_contact_by_email(&record.email)
                    .await?
                    .ok_or_else(|| CrmError::NotFound(record.email.clone()))?;
                self.api.update_contact(&id, record).await?;
                (id, UpsertAction::Updated)
            }
            Err(e) => return Err(e),
        };

        let note_attached = match note.map(str::trim).filter(|n| !n.is_empty()) {
            Some(body) => match self.api.create_note(&contact_id, body).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(contact_id = %contact_id, error = %e, "Failed to attach CRM note");
                    false
                }
            },
            None => false,
        };

        info!(
            contact_id = %contact_id,
            action = ?action,
            source = record.source.as_str(),
            note_attached,
            "Lead upserted"
        );

        Ok(LeadUpsert {
            contact_id,
            action,
            note_attached,
        })
    }
}

#[async_trait]
impl<A: CrmApi> LeadCapture for LeadSink<A> {
    async fn upsert_lead(&self, record: &LeadRecord, note: Option<&str>) -> Result<LeadUpsert, CrmError> {
        self.upsert(record, note).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCrm;
    use crate::types::LeadSource;

    fn record(phone: &str) -> LeadRecord {
        LeadRecord::from_full_name("maria@example.com", "María Pérez", LeadSource::QuoteForm)
            .with_phone(Some(phone.to_string()))
            .with_field("insurance_type", "auto")
    }

    #[tokio::test]
    async fn test_new_contact_is_created_with_note() {
        let sink = LeadSink::new(InMemoryCrm::new());

        let result = sink.upsert(&record("+13055550100"), Some("Quote request")).await.unwrap();

        assert_eq!(result.action, UpsertAction::Created);
        assert!(result.note_attached);
        assert_eq!(sink.api().notes_for(&result.contact_id), vec!["Quote request".to_string()]);
    }

    #[tokio::test]
    async fn test_existing_email_is_updated_not_duplicated() {
        let sink = LeadSink::new(InMemoryCrm::new());

        let first = sink.upsert(&record("+13055550100"), None).await.unwrap();
        let second = sink.upsert(&record("+13055550199"), None).await.unwrap();

        assert_eq!(first.action, UpsertAction::Created);
        assert_eq!(second.action, UpsertAction::Updated);
        assert_eq!(first.contact_id, second.contact_id);
        assert_eq!(sink.api().contact_count(), 1);

        let stored = sink.api().contact(&first.contact_id).unwrap();
        assert_eq!(stored.phone.as_deref(), Some("+13055550199"));
    }

    #[tokio::test]
    async fn test_note_failure_does_not_fail_upsert() {
        let sink = LeadSink::new(InMemoryCrm::new().failing_notes());

        let result = sink.upsert(&record("+13055550100"), Some("hello")).await.unwrap();

        assert_eq!(result.action, UpsertAction::Created);
        assert!(!result.note_attached);
    }

    #[tokio::test]
    async fn test_blank_note_is_skipped() {
        let sink = LeadSink::new(InMemoryCrm::new());

        let result = sink.upsert(&record("+13055550100"), Some("   ")).await.unwrap();

        assert!(!result.note_attached);
        assert!(sink.api().notes_for(&result.contact_id).is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_other_than_conflict_is_terminal() {
        let sink = LeadSink::new(InMemoryCrm::new().failing_creates());

        let err = sink.upsert(&record("+13055550100"), None).await.unwrap_err();

        assert!(matches!(err, CrmError::Api { status: 500, .. }));
        assert_eq!(sink.api().contact_count(), 0);
    }
}
