//! HubSpot CRM v3 client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::HubspotConfig;
use crate::types::{ContactId, LeadRecord};
use crate::{CrmApi, CrmError};

/// HubSpot-defined association type for note → contact.
const NOTE_TO_CONTACT_ASSOCIATION: u32 = 202;

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ObjectResponse>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HubSpot client using a private-app bearer token.
#[derive(Clone)]
pub struct HubspotClient {
    http: Client,
    config: HubspotConfig,
}

impl HubspotClient {
    pub fn new(config: HubspotConfig) -> Result<Self, CrmError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, CrmError> {
        Self::new(HubspotConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    async fn check(response: Response) -> Result<Response, CrmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::CONFLICT {
            return Err(CrmError::Conflict);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);
        Err(CrmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CrmApi for HubspotClient {
    async fn create_contact(&self, record: &LeadRecord) -> Result<ContactId, CrmError> {
        let response = self
            .http
            .post(self.url("/crm/v3/objects/contacts"))
            .bearer_auth(self.config.api_key())
            .json(&json!({ "properties": record.properties() }))
            .send()
            .await?;

        let created: ObjectResponse = Self::check(response).await?.json().await?;
        debug!(contact_id = %created.id, "Created CRM contact");
        Ok(ContactId(created.id))
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, CrmError> {
        let body = json!({
            "filterGroups": [{
                "filters": [{ "propertyName": "email", "operator": "EQ", "value": email }]
            }],
            "limit": 1
        });

        let response = self
            .http
            .post(self.url("/crm/v3/objects/contacts/search"))
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await?;

        let found: SearchResponse = Self::check(response).await?.json().await?;
        Ok(found.results.into_iter().next().map(|o| ContactId(o.id)))
    }

    async fn update_contact(&self, id: &ContactId, record: &LeadRecord) -> Result<(), CrmError> {
        let response = self
            .http
            .patch(self.url(&format!("/crm/v3/objects/contacts/{}", id)))
            .bearer_auth(self.config.api_key())
            .json(&json!({ "properties": record.properties() }))
            .send()
            .await?;

        Self::check(response).await?;
        debug!(contact_id = %id, "Updated CRM contact");
        Ok(())
    }

    async fn create_note(&self, id: &ContactId, body: &str) -> Result<(), CrmError> {
        let payload = json!({
            "properties": {
                "hs_note_body": body,
                "hs_timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "associations": [{
                "to": { "id": id.0 },
                "types": [{
                    "associationCategory": "HUBSPOT_DEFINED",
                    "associationTypeId": NOTE_TO_CONTACT_ASSOCIATION
                }]
            }]
        });

        let response = self
            .http
            .post(self.url("/crm/v3/objects/notes"))
            .bearer_auth(self.config.api_key())
            .json(&payload)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HubspotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubspotClient")
            .field("api_url", &self.config.api_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let config = HubspotConfig::new("pat-xxx").with_api_url("http://localhost:8080/");
        let client = HubspotClient::new(config).unwrap();
        assert_eq!(
            client.url("/crm/v3/objects/contacts"),
            "http://localhost:8080/crm/v3/objects/contacts"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client = HubspotClient::new(HubspotConfig::new("pat-secret-value")).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("pat-secret-value"));
    }

    #[test]
    fn test_search_response_parsing() {
        let found: SearchResponse =
            serde_json::from_str(r#"{"total":1,"results":[{"id":"501","properties":{}}]}"#).unwrap();
        assert_eq!(found.results[0].id, "501");

        let empty: SearchResponse = serde_json::from_str(r#"{"total":0,"results":[]}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
