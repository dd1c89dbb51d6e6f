//! Document store seam
//!
//! The store keeps one JSON document per project id plus an append-only set of
//! participant responses. The reconciliation controller and the participant flow
//! only ever talk to it through [`DocumentStore`].

use async_trait::async_trait;
use std::fmt;

use crate::participant::ResponseRecord;
use crate::survey::{Project, ResponseStorageConfig, SurveyDocument};

/// Failure of a document store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached
    Unavailable(String),
    /// The call did not finish in time
    Timeout,
    /// No document exists under the id
    NotFound(String),
    /// The store answered but refused the call
    Rejected { status: Option<u16>, message: String },
    /// The store answered with something that is not a valid document
    Malformed(String),
}

impl StoreError {
    /// Network-level failures after which cached drafts must be retained
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) | StoreError::Timeout => true,
            StoreError::Rejected {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }

    pub fn from_reqwest_error(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StoreError::Timeout
        } else if let Some(status) = error.status() {
            StoreError::Rejected {
                status: Some(status.as_u16()),
                message: error.to_string(),
            }
        } else if error.is_decode() {
            StoreError::Malformed(error.to_string())
        } else {
            StoreError::Unavailable(error.to_string())
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "document store unavailable: {}", reason),
            StoreError::Timeout => write!(f, "document store call timed out"),
            StoreError::NotFound(id) => write!(f, "no document stored for project '{}'", id),
            StoreError::Rejected {
                status: Some(status),
                message,
            } => write!(f, "document store rejected the call (HTTP {}): {}", status, message),
            StoreError::Rejected {
                status: None,
                message,
            } => write!(f, "document store rejected the call: {}", message),
            StoreError::Malformed(reason) => write!(f, "malformed document store reply: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// A project record together with its survey document
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub project: Project,
    /// Absent for projects that were created but never given a survey
    pub survey_document: Option<SurveyDocument>,
    pub response_storage_config: Option<ResponseStorageConfig>,
}

impl StoredDocument {
    pub fn new(project: Project, survey_document: SurveyDocument) -> Self {
        Self {
            response_storage_config: project.response_storage.clone(),
            project,
            survey_document: Some(survey_document),
        }
    }

    /// Declares preloaded images without carrying them
    pub fn is_lightweight(&self) -> bool {
        self.project.is_lightweight()
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a project's document, possibly in its lightweight form
    async fn fetch(&self, project_id: &str) -> Result<StoredDocument, StoreError>;

    /// Read a project's document with the full image payload
    async fn fetch_full(&self, project_id: &str) -> Result<StoredDocument, StoreError>;

    /// Create or overwrite a project's document
    async fn put(&self, project_id: &str, document: &StoredDocument) -> Result<(), StoreError>;

    async fn delete(&self, project_id: &str) -> Result<(), StoreError>;

    /// Identifiers of every stored document
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Append a participant response, returning the key it was stored under
    async fn append_response(&self, record: &ResponseRecord) -> Result<String, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(StoreError::Unavailable("refused".into()).is_unavailable());
        assert!(StoreError::Timeout.is_unavailable());
        assert!(
            StoreError::Rejected {
                status: Some(502),
                message: "bad gateway".into()
            }
            .is_unavailable()
        );
        assert!(
            !StoreError::Rejected {
                status: Some(400),
                message: "bad request".into()
            }
            .is_unavailable()
        );
        assert!(!StoreError::NotFound("p1".into()).is_unavailable());
        assert!(!StoreError::Malformed("not json".into()).is_unavailable());
    }

    #[test]
    fn test_display_names_project() {
        let message = StoreError::NotFound("p7".into()).to_string();
        assert!(message.contains("'p7'"));
    }
}
