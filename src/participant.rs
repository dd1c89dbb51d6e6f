//! Participant flow
//!
//! Loads a published project, materializes it for one participant and writes
//! the completed response back to the document store.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::api::{DocumentStore, response_key};
use crate::images::ImageProvider;
use crate::materialize::{RuntimeDocument, materialize};
use crate::survey::SurveyDocument;

/// Completion metadata stored with every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyMetadata {
    pub completion_time: DateTime<Utc>,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_resolution: Option<String>,
    pub survey_version: String,
    pub project_id: String,
}

/// One participant's completed survey, written once and never changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub participant_id: String,
    pub responses: Map<String, Value>,
    /// Question name to the names of the images the participant saw
    pub displayed_images: BTreeMap<String, Vec<String>>,
    pub survey_metadata: SurveyMetadata,
}

impl ResponseRecord {
    /// Record for answers given to a materialized document
    ///
    /// A fresh participant id is generated when none is supplied.
    pub fn new(
        project_id: &str,
        runtime: &RuntimeDocument,
        responses: Map<String, Value>,
        participant_id: Option<String>,
    ) -> Self {
        Self {
            participant_id: participant_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            responses,
            displayed_images: runtime.displayed_images.clone(),
            survey_metadata: SurveyMetadata {
                completion_time: Utc::now(),
                user_agent: format!("survey-studio/{}", env!("CARGO_PKG_VERSION")),
                screen_resolution: None,
                survey_version: survey_version(project_id),
                project_id: project_id.to_string(),
            },
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.survey_metadata.user_agent = user_agent.into();
        self
    }

    pub fn with_screen_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.survey_metadata.screen_resolution = Some(resolution.into());
        self
    }

    /// Key the response is appended under
    pub fn storage_key(&self) -> String {
        response_key(&self.participant_id, &self.survey_metadata.completion_time)
    }

    /// Answer keys that match no question of the runtime document
    pub fn unknown_answers<'a>(&'a self, runtime: &RuntimeDocument) -> Vec<&'a str> {
        let known = runtime.answer_names();
        self.responses
            .keys()
            .map(String::as_str)
            .filter(|key| !known.contains(key))
            .collect()
    }
}

pub fn survey_version(project_id: &str) -> String {
    format!("2.0-admin-{}", project_id)
}

/// Fetch a project's published document and materialize it
pub async fn load_runtime<S, R>(
    store: &S,
    provider: &dyn ImageProvider,
    project_id: &str,
    rng: &mut R,
) -> Result<RuntimeDocument>
where
    S: DocumentStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut stored = store
        .fetch(project_id)
        .await
        .with_context(|| format!("Failed to load project '{}'", project_id))?;

    if stored.is_lightweight() {
        match store.fetch_full(project_id).await {
            Ok(full) => stored = full,
            Err(err) => warn!(
                "Rendering project '{}' without its preloaded images: {}",
                project_id, err
            ),
        }
    }

    let document = match stored.survey_document {
        Some(document) => document,
        None => {
            warn!("Project '{}' has no survey document, using the default", project_id);
            SurveyDocument::starter()
        }
    };

    Ok(materialize(&document, &stored.project, provider, rng).await)
}

/// Append a completed response to the store, returning its key
pub async fn submit_response<S>(store: &S, record: &ResponseRecord) -> Result<String>
where
    S: DocumentStore + ?Sized,
{
    let key = store
        .append_response(record)
        .await
        .with_context(|| {
            format!(
                "Failed to store response of participant '{}'",
                record.participant_id
            )
        })?;
    info!(
        "Stored response of participant '{}' for project '{}'",
        record.participant_id, record.survey_metadata.project_id
    );
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryDocumentStore;
    use crate::api::StoredDocument;
    use crate::images::StaticImageProvider;
    use crate::survey::Project;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[tokio::test]
    async fn test_submit_appends_record() {
        let store = MemoryDocumentStore::new();
        store.insert(StoredDocument::new(
            Project::new("p1", "Streets"),
            SurveyDocument::starter(),
        ));

        let mut rng = StdRng::seed_from_u64(9);
        let runtime = load_runtime(&store, &StaticImageProvider::new(), "p1", &mut rng)
            .await
            .unwrap();

        let mut answers = Map::new();
        answers.insert("age".to_string(), json!(34));
        let record = ResponseRecord::new("p1", &runtime, answers, Some("anon-1".to_string()))
            .with_screen_resolution("1920x1080");

        let key = submit_response(&store, &record).await.unwrap();
        assert!(key.starts_with("response_anon-1_"));
        assert!(!key.contains(':'));
        assert_eq!(store.responses().get(&key), Some(&record));
        assert_eq!(record.survey_metadata.survey_version, "2.0-admin-p1");
        assert_eq!(record.unknown_answers(&runtime), vec!["age"]);
    }

    #[test]
    fn test_generated_participant_id() {
        let runtime = RuntimeDocument {
            survey: crate::materialize::RuntimeSurvey {
                title: String::new(),
                description: None,
                logo: String::new(),
                logo_position: "right".to_string(),
                settings: Default::default(),
                pages: Vec::new(),
                extra: Map::new(),
            },
            theme: None,
            displayed_images: BTreeMap::new(),
        };

        let a = ResponseRecord::new("p1", &runtime, Map::new(), None);
        let b = ResponseRecord::new("p1", &runtime, Map::new(), Some("  ".to_string()));
        assert!(uuid::Uuid::parse_str(&a.participant_id).is_ok());
        assert_ne!(a.participant_id, b.participant_id);
    }

    #[tokio::test]
    async fn test_missing_project_fails_to_load() {
        let store = MemoryDocumentStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            load_runtime(&store, &StaticImageProvider::new(), "nope", &mut rng)
                .await
                .is_err()
        );
    }
}
