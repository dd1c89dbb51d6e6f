use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::constants::{self, headers};
use super::models::{DocumentEnvelope, ListEnvelope, PutDocumentRequest, StatusEnvelope};
use super::resilience::{ResilienceConfig, RetryPolicy};
use super::store::{DocumentStore, StoreError, StoredDocument};
use crate::participant::ResponseRecord;

/// Document store reached over HTTP
#[derive(Clone)]
pub struct HttpDocumentStore {
    base_url: String,
    http_client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>, resilience: &ResilienceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(resilience.request_timeout)
            .connect_timeout(resilience.connect_timeout)
            .user_agent(constants::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, http_client, resilience))
    }

    pub fn with_custom_client(
        base_url: impl Into<String>,
        http_client: reqwest::Client,
        resilience: &ResilienceConfig,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            retry_policy: RetryPolicy::new(resilience.retry.clone()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_document(&self, project_id: &str, url: &str) -> Result<StoredDocument, StoreError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        debug!("GET {} [{}]", url, correlation_id);

        let envelope: DocumentEnvelope = self
            .retry_policy
            .execute(|| async {
                let response = self
                    .http_client
                    .get(url)
                    .header(headers::X_CORRELATION_ID, &correlation_id)
                    .send()
                    .await
                    .map_err(StoreError::from_reqwest_error)?;
                read_json(response, project_id).await
            })
            .await?;

        envelope.into_stored(project_id)
    }
}

/// Decode a document endpoint reply; 404 means the project has no document
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    project_id: &str,
) -> Result<T, StoreError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(project_id.to_string()));
    }
    read_reply(response).await
}

/// Decode a JSON reply, mapping every non-2xx status onto a rejection
async fn read_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(StoreError::from_reqwest_error)?;

    if !status.is_success() {
        let mut message = error_message(&body);
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("no reason given").to_string();
        }
        return Err(StoreError::Rejected {
            status: Some(status.as_u16()),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))
}

/// The `error` field of a failure body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<StatusEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, project_id: &str) -> Result<StoredDocument, StoreError> {
        let url = constants::document_endpoint(&self.base_url, project_id);
        self.get_document(project_id, &url).await
    }

    async fn fetch_full(&self, project_id: &str) -> Result<StoredDocument, StoreError> {
        let url = constants::full_document_endpoint(&self.base_url, project_id);
        self.get_document(project_id, &url).await
    }

    async fn put(&self, project_id: &str, document: &StoredDocument) -> Result<(), StoreError> {
        let url = constants::document_endpoint(&self.base_url, project_id);
        let body = PutDocumentRequest::from(document);
        let correlation_id = uuid::Uuid::new_v4().to_string();
        debug!("PUT {} [{}]", url, correlation_id);

        let envelope: StatusEnvelope = self
            .retry_policy
            .execute(|| async {
                let response = self
                    .http_client
                    .put(&url)
                    .header("Content-Type", headers::CONTENT_TYPE_JSON)
                    .header(headers::X_CORRELATION_ID, &correlation_id)
                    .json(&body)
                    .send()
                    .await
                    .map_err(StoreError::from_reqwest_error)?;
                read_json(response, project_id).await
            })
            .await?;

        envelope.into_result()?;
        info!("Stored document for project '{}'", project_id);
        Ok(())
    }

    async fn delete(&self, project_id: &str) -> Result<(), StoreError> {
        let url = constants::document_endpoint(&self.base_url, project_id);
        debug!("DELETE {}", url);

        let envelope: StatusEnvelope = self
            .retry_policy
            .execute(|| async {
                let response = self
                    .http_client
                    .delete(&url)
                    .send()
                    .await
                    .map_err(StoreError::from_reqwest_error)?;
                read_json(response, project_id).await
            })
            .await?;

        envelope.into_result()?;
        info!("Deleted document for project '{}'", project_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let url = constants::documents_endpoint(&self.base_url);
        debug!("GET {}", url);

        let envelope: ListEnvelope = self
            .retry_policy
            .execute(|| async {
                let response = self
                    .http_client
                    .get(&url)
                    .send()
                    .await
                    .map_err(StoreError::from_reqwest_error)?;
                read_json(response, "*").await
            })
            .await?;

        Ok(envelope.into_ids())
    }

    async fn append_response(&self, record: &ResponseRecord) -> Result<String, StoreError> {
        let url = constants::responses_endpoint(&self.base_url);
        debug!("POST {} for participant {}", url, record.participant_id);

        // Sent once; the server appends every POST it receives
        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", headers::CONTENT_TYPE_JSON)
            .json(record)
            .send()
            .await
            .map_err(StoreError::from_reqwest_error)?;
        // A missing endpoint says nothing about the project, so no NotFound here
        let envelope: StatusEnvelope = read_reply(response).await?;

        let key = envelope.into_result()?.unwrap_or_else(|| record.storage_key());
        info!("Stored response {}", key);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"success":false,"error":"disk full"}"#), "disk full");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let store =
            HttpDocumentStore::new("http://localhost:3001/api/", &ResilienceConfig::disabled())
                .unwrap();
        assert_eq!(store.base_url(), "http://localhost:3001/api");
    }
}
