//! Wire envelopes of the document store HTTP surface

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::{StoreError, StoredDocument};
use crate::survey::{Project, ResponseStorageConfig, SurveyDocument};

fn default_success() -> bool {
    true
}

/// Body of `PUT /documents/{projectId}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutDocumentRequest<'a> {
    pub project: &'a Project,
    pub survey_document: Option<&'a SurveyDocument>,
    pub response_storage_config: Option<&'a ResponseStorageConfig>,
}

impl<'a> From<&'a StoredDocument> for PutDocumentRequest<'a> {
    fn from(document: &'a StoredDocument) -> Self {
        Self {
            project: &document.project,
            survey_document: document.survey_document.as_ref(),
            response_storage_config: document.response_storage_config.as_ref(),
        }
    }
}

/// Reply of `GET /documents/{projectId}`
///
/// Older servers name the survey `surveyConfig` and the response storage
/// `supabaseConfig`; both spellings are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub project: Option<Value>,
    #[serde(default, alias = "surveyConfig")]
    pub survey_document: Option<Value>,
    #[serde(default, alias = "supabaseConfig")]
    pub response_storage_config: Option<Value>,
}

impl DocumentEnvelope {
    /// Validate the envelope into a typed document
    pub fn into_stored(self, project_id: &str) -> Result<StoredDocument, StoreError> {
        if !self.success {
            return Err(StoreError::Rejected {
                status: None,
                message: self
                    .error
                    .unwrap_or_else(|| format!("failed to load project '{}'", project_id)),
            });
        }

        let project_value = self.project.ok_or_else(|| {
            StoreError::Malformed(format!("document for '{}' has no project record", project_id))
        })?;
        let project: Project = serde_json::from_value(project_value).map_err(|e| {
            StoreError::Malformed(format!("project record of '{}': {}", project_id, e))
        })?;

        let survey_document = match self.survey_document {
            None | Some(Value::Null) => None,
            Some(value) => Some(SurveyDocument::from_value(value).map_err(|e| {
                StoreError::Malformed(format!("survey document of '{}': {}", project_id, e))
            })?),
        };

        let response_storage_config = match self.response_storage_config {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value).map_err(|e| {
                StoreError::Malformed(format!(
                    "response storage config of '{}': {}",
                    project_id, e
                ))
            })?),
        };

        Ok(StoredDocument {
            project,
            survey_document,
            response_storage_config,
        })
    }
}

/// Reply of the write, delete and response endpoints
#[derive(Debug, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Key the server stored a response under
    #[serde(default, alias = "key")]
    pub filename: Option<String>,
}

impl StatusEnvelope {
    pub fn into_result(self) -> Result<Option<String>, StoreError> {
        if self.success {
            Ok(self.filename)
        } else {
            Err(StoreError::Rejected {
                status: None,
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Reply of `GET /documents`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope {
    Bare(Vec<String>),
    Wrapped {
        #[serde(alias = "files")]
        documents: Vec<String>,
    },
}

impl ListEnvelope {
    /// Document identifiers with storage filename suffixes removed
    pub fn into_ids(self) -> Vec<String> {
        let names = match self {
            ListEnvelope::Bare(names) => names,
            ListEnvelope::Wrapped { documents } => documents,
        };
        names.into_iter().map(|name| document_id(&name)).collect()
    }
}

pub fn document_id(name: &str) -> String {
    name.strip_suffix(".json").unwrap_or(name).to_string()
}

/// Storage key of a participant response
pub fn response_key(participant_id: &str, completed_at: &DateTime<Utc>) -> String {
    let timestamp = completed_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("response_{}_{}", participant_id, timestamp)
}
