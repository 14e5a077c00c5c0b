//! In-process [`CrmApi`] used by tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::{ContactId, LeadRecord};
use crate::{CrmApi, CrmError};

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    contacts: HashMap<ContactId, LeadRecord>,
    notes: HashMap<ContactId, Vec<String>>,
}

/// CRM double that enforces email uniqueness like the real service.
#[derive(Debug, Default)]
pub struct InMemoryCrm {
    state: Mutex<State>,
    fail_creates: bool,
    fail_notes: bool,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every create answers HTTP 500.
    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    /// Every note creation answers HTTP 500.
    pub fn failing_notes(mut self) -> Self {
        self.fail_notes = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contact_count(&self) -> usize {
        self.lock().contacts.len()
    }

    pub fn contact(&self, id: &ContactId) -> Option<LeadRecord> {
        self.lock().contacts.get(id).cloned()
    }

    pub fn notes_for(&self, id: &ContactId) -> Vec<String> {
        self.lock().notes.get(id).cloned().unwrap_or_default()
    }
}

fn server_error() -> CrmError {
    CrmError::Api {
        status: 500,
        message: "internal error".to_string(),
    }
}

#[async_trait]
impl CrmApi for InMemoryCrm {
    async fn create_contact(&self, record: &LeadRecord) -> Result<ContactId, CrmError> {
        if self.fail_creates {
            return Err(server_error());
        }
        let mut state = self.lock();
        if state.contacts.values().any(|c| c.email == record.email) {
            return Err(CrmError::Conflict);
        }
        state.next_id += 1;
        let id = ContactId(state.next_id.to_string());
        state.contacts.insert(id.clone(), record.clone());
        Ok(id)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, CrmError> {
        Ok(self
            .lock()
            .contacts
            .iter()
            .find(|(_, c)| c.email == email)
            .map(|(id, _)| id.clone()))
    }

    async fn update_contact(&self, id: &ContactId, record: &LeadRecord) -> Result<(), CrmError> {
        let mut state = self.lock();
        match state.contacts.get_mut(id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(CrmError::NotFound(id.to_string())),
        }
    }

    async fn create_note(&self, id: &ContactId, body: &str) -> Result<(), CrmError> {
        if self.fail_notes {
            return Err(server_error());
        }
        self.lock().notes.entry(id.clone()).or_default().push(body.to_string());
        Ok(())
    }
}
