//! Project reconciliation controller
//!
//! Decides on every activation whether a project resumes from the session cache
//! or loads fresh from the document store, keeps the cache current as drafts
//! change, and flushes drafts to the store on request.
//!
//! Every operation takes `&mut self`, so one controller never runs two persists
//! at once. Two controllers writing the same project are not coordinated; the
//! last persist wins.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Duration;

use crate::api::models::document_id;
use crate::api::{DocumentStore, StoreError, StoredDocument};
use crate::session::{ProjectEditingState, SessionCache, is_valid_project_key};
use crate::survey::{ImageDatasetConfig, NameCollisions, Project, SurveyDocument, ThemeTokens};

/// Index of the last authoring step
pub const LAST_TAB_INDEX: usize = 3;

pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(30);

/// What an activation hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub project: Project,
    pub document: SurveyDocument,
    pub active_tab_index: usize,
    pub is_dirty: bool,
    /// Restored from the session cache rather than loaded from the store
    pub resumed: bool,
}

impl Activation {
    fn from_state(state: &ProjectEditingState, resumed: bool) -> Self {
        Self {
            project: state.project.clone(),
            document: state.draft_document.clone(),
            active_tab_index: state.active_tab_index,
            is_dirty: state.is_dirty,
            resumed,
        }
    }
}

/// Summary of one cached project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStatus {
    pub project_id: String,
    pub name: String,
    pub is_active: bool,
    pub is_dirty: bool,
    pub image_dataset_dirty: bool,
    pub active_tab_index: usize,
    pub page_count: usize,
    pub question_count: usize,
    pub collisions: NameCollisions,
}

pub struct ProjectController<S: DocumentStore> {
    store: S,
    cache: SessionCache,
    active_project_id: Option<String>,
    persist_timeout: Duration,
}

impl<S: DocumentStore> ProjectController<S> {
    pub fn new(store: S, cache: SessionCache) -> Self {
        Self {
            store,
            cache,
            active_project_id: None,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active_project_id.as_deref()
    }

    pub fn state(&self, project_id: &str) -> Option<&ProjectEditingState> {
        self.cache.get(project_id)
    }

    fn cached_state(&self, project_id: &str) -> Result<ProjectEditingState> {
        self.cache
            .get(project_id)
            .cloned()
            .with_context(|| format!("Project '{}' has no editing state in this session", project_id))
    }

    /// Write the active project's state back to the cache before leaving it
    fn stash_active(&mut self) -> Result<()> {
        let Some(active_id) = self.active_project_id.clone() else {
            return Ok(());
        };
        if let Some(state) = self.cache.get(&active_id).cloned() {
            debug!("Stashing draft of project '{}' in session cache", active_id);
            self.cache
                .put(&active_id, state)
                .with_context(|| format!("Failed to stash draft of project '{}'", active_id))?;
        }
        Ok(())
    }

    /// Make `project_id` the active project
    ///
    /// A cached state is restored verbatim and takes precedence over the store.
    /// Otherwise the store's document seeds a clean state.
    pub async fn activate_project(&mut self, project_id: &str) -> Result<Activation> {
        if !is_valid_project_key(project_id) {
            anyhow::bail!("Invalid project id {:?}", project_id);
        }

        if self.active_project_id.as_deref() != Some(project_id) {
            self.stash_active()?;
        }
        self.active_project_id = None;

        if let Some(state) = self.cache.get(project_id) {
            info!(
                "Resuming project '{}' from session cache (dirty: {}, tab: {})",
                project_id, state.is_dirty, state.active_tab_index
            );
            let activation = Activation::from_state(state, true);
            self.active_project_id = Some(project_id.to_string());
            return Ok(activation);
        }

        let (project, document) = self.load_from_store(project_id).await?;
        let state = ProjectEditingState::fresh(project, document);
        let activation = Activation::from_state(&state, false);
        self.cache
            .put(project_id, state)
            .with_context(|| format!("Failed to cache state of project '{}'", project_id))?;
        self.active_project_id = Some(project_id.to_string());

        info!("Loaded project '{}' from document store", project_id);
        Ok(activation)
    }

    async fn load_from_store(&self, project_id: &str) -> Result<(Project, SurveyDocument)> {
        let stored = match self.store.fetch(project_id).await {
            Ok(stored) => stored,
            Err(StoreError::NotFound(_)) => {
                warn!(
                    "No stored document for project '{}', starting from the default survey",
                    project_id
                );
                return Ok((Project::new(project_id, project_id), SurveyDocument::starter()));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to load project '{}'", project_id));
            }
        };

        let stored = if stored.is_lightweight() {
            debug!("Project '{}' came back lightweight, fetching full record", project_id);
            match self.store.fetch_full(project_id).await {
                Ok(full) => full,
                Err(err) => {
                    warn!(
                        "Continuing with lightweight record of project '{}': {}",
                        project_id, err
                    );
                    stored
                }
            }
        } else {
            stored
        };

        let StoredDocument {
            mut project,
            survey_document,
            response_storage_config,
        } = stored;
        if project.response_storage.is_none() {
            project.response_storage = response_storage_config;
        }
        let document = survey_document.unwrap_or_else(SurveyDocument::starter);
        Ok((project, document))
    }

    /// Replace a project's draft and recompute its dirty flag
    ///
    /// Returns whether the project is dirty afterwards. Repeating the same draft
    /// leaves the state unchanged.
    pub fn record_edit(&mut self, project_id: &str, draft: SurveyDocument) -> Result<bool> {
        let mut state = self.cached_state(project_id)?;

        let collisions = draft.name_collisions();
        if !collisions.is_empty() {
            warn!("Draft of project '{}' reuses names: {}", project_id, collisions);
        }

        let is_dirty = state.replace_draft(draft);
        self.cache.put(project_id, state)?;
        debug!("Recorded edit for project '{}' (dirty: {})", project_id, is_dirty);
        Ok(is_dirty)
    }

    /// Apply `edit` to a copy of the draft and record the result
    pub fn update_draft<T>(
        &mut self,
        project_id: &str,
        edit: impl FnOnce(&mut SurveyDocument) -> Result<T>,
    ) -> Result<T> {
        let mut draft = self.cached_state(project_id)?.draft_document;
        let output = edit(&mut draft)?;
        self.record_edit(project_id, draft)?;
        Ok(output)
    }

    /// Apply a named theme preset, or the standard palette for "default"
    pub fn apply_theme_preset(&mut self, project_id: &str, preset: &str) -> Result<()> {
        let tokens = match preset {
            "default" | "reset" => ThemeTokens::standard(),
            name => ThemeTokens::preset(name)
                .with_context(|| format!("Unknown theme preset '{}'", name))?,
        };
        self.update_draft(project_id, |draft| {
            draft.theme = Some(tokens);
            Ok(())
        })
    }

    /// Duplicate a page of the draft, returning the copy's index
    pub fn duplicate_page(&mut self, project_id: &str, page_index: usize) -> Result<usize> {
        self.update_draft(project_id, |draft| draft.duplicate_page(page_index))
    }

    pub fn set_active_tab(&mut self, project_id: &str, index: usize) -> Result<usize> {
        let mut state = self.cached_state(project_id)?;
        state.active_tab_index = index.min(LAST_TAB_INDEX);
        let tab = state.active_tab_index;
        self.cache.put(project_id, state)?;
        Ok(tab)
    }

    pub fn next_tab(&mut self, project_id: &str) -> Result<usize> {
        let current = self.cached_state(project_id)?.active_tab_index;
        self.set_active_tab(project_id, current + 1)
    }

    /// Stage image dataset edits to be written with the next persist
    pub fn stage_image_dataset(&mut self, project_id: &str, config: ImageDatasetConfig) -> Result<()> {
        let mut state = self.cached_state(project_id)?;
        state.pending_image_dataset = Some(config);
        state.refresh_dirty();
        self.cache.put(project_id, state)?;
        info!("Staged image dataset changes for project '{}'", project_id);
        Ok(())
    }

    /// Write the cached draft of a project to the document store
    ///
    /// On failure the cached state is left exactly as it was and the store error
    /// is returned unwrapped.
    pub async fn persist(&mut self, project_id: &str) -> Result<()> {
        let state = self.cached_state(project_id)?;
        let written = state.draft_document.clone();
        let project = state.project_for_persist();
        let record = StoredDocument::new(project.clone(), written.clone());

        let outcome = match tokio::time::timeout(
            self.persist_timeout,
            self.store.put(project_id, &record),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        };

        if let Err(err) = outcome {
            warn!(
                "Failed to persist project '{}', keeping draft in session cache: {}",
                project_id, err
            );
            return Err(err.into());
        }

        let mut state = self.cached_state(project_id)?;
        state.mark_persisted(&written, project);
        self.cache.put(project_id, state)?;
        info!("Persisted project '{}'", project_id);
        Ok(())
    }

    /// Leave the active project, keeping its cached state
    pub fn deactivate_project(&mut self) -> Result<()> {
        self.stash_active()?;
        self.active_project_id = None;
        Ok(())
    }

    /// Forget a project's cached state entirely
    pub fn discard_project(&mut self, project_id: &str) -> Result<()> {
        if self.active_project_id.as_deref() == Some(project_id) {
            self.active_project_id = None;
        }
        if self.cache.remove(project_id)?.is_some() {
            info!("Discarded session state of project '{}'", project_id);
        }
        Ok(())
    }

    /// Forget every cached project, unsaved drafts included
    pub fn clear_session(&mut self) -> Result<()> {
        self.active_project_id = None;
        self.cache.clear()?;
        info!("Cleared session state");
        Ok(())
    }

    /// Create a project with the default survey, store it and activate it
    pub async fn create_project(&mut self, name: &str) -> Result<Activation> {
        let project = Project::create(name);
        let project_id = project.id.clone();
        let record = StoredDocument::new(project, SurveyDocument::starter());

        let written =
            match tokio::time::timeout(self.persist_timeout, self.store.put(&project_id, &record)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout),
            };
        written.with_context(|| format!("Failed to create project '{}'", name))?;

        info!("Created project '{}' ({})", name, project_id);
        self.activate_project(&project_id).await
    }

    /// Delete a project from the store and drop its session state
    pub async fn delete_project(&mut self, project_id: &str) -> Result<()> {
        match self.store.delete(project_id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                warn!("Project '{}' was already absent from the store", project_id);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to delete project '{}'", project_id));
            }
        }
        self.discard_project(project_id)
    }

    pub async fn list_projects(&self) -> Result<Vec<String>> {
        let ids = self
            .store
            .list()
            .await
            .context("Failed to list projects")?;
        Ok(ids.iter().map(|id| document_id(id)).collect())
    }

    pub fn status(&self, project_id: &str) -> Option<ProjectStatus> {
        let state = self.cache.get(project_id)?;
        Some(ProjectStatus {
            project_id: project_id.to_string(),
            name: state.project.name.clone(),
            is_active: self.active_project_id.as_deref() == Some(project_id),
            is_dirty: state.is_dirty,
            image_dataset_dirty: state.image_dataset_dirty(),
            active_tab_index: state.active_tab_index,
            page_count: state.draft_document.pages.len(),
            question_count: state.draft_document.question_count(),
            collisions: state.draft_document.name_collisions(),
        })
    }

    /// Status of every cached project, ordered by id
    pub fn statuses(&self) -> Vec<ProjectStatus> {
        self.cache
            .project_ids()
            .into_iter()
            .filter_map(|id| self.status(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryDocumentStore;
    use crate::session::MemoryMirror;

    fn controller() -> (ProjectController<MemoryDocumentStore>, MemoryDocumentStore) {
        let store = MemoryDocumentStore::new();
        let cache = SessionCache::new(Box::new(MemoryMirror::new()));
        (ProjectController::new(store.clone(), cache), store)
    }

    #[tokio::test]
    async fn test_missing_project_starts_from_default_survey() {
        let (mut controller, _) = controller();
        let activation = controller.activate_project("fresh").await.unwrap();

        assert!(!activation.resumed);
        assert!(!activation.is_dirty);
        assert_eq!(activation.document, SurveyDocument::starter());
        assert_eq!(controller.active_project_id(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_invalid_project_id_is_rejected() {
        let (mut controller, _) = controller();
        assert!(controller.activate_project("null").await.is_err());
        assert!(controller.cache().is_empty());
    }

    #[tokio::test]
    async fn test_tab_navigation_is_clamped() {
        let (mut controller, _) = controller();
        controller.activate_project("p1").await.unwrap();

        assert_eq!(controller.set_active_tab("p1", 2).unwrap(), 2);
        assert_eq!(controller.next_tab("p1").unwrap(), 3);
        assert_eq!(controller.next_tab("p1").unwrap(), 3);
        assert_eq!(controller.set_active_tab("p1", 99).unwrap(), LAST_TAB_INDEX);
    }

    #[tokio::test]
    async fn test_record_edit_is_idempotent() {
        let (mut controller, _) = controller();
        controller.activate_project("p1").await.unwrap();

        let mut draft = SurveyDocument::starter();
        draft.title = "Edited".to_string();
        assert!(controller.record_edit("p1", draft.clone()).unwrap());
        let first = controller.state("p1").cloned();
        assert!(controller.record_edit("p1", draft).unwrap());
        assert_eq!(controller.state("p1").cloned(), first);
    }

    #[tokio::test]
    async fn test_unknown_theme_preset() {
        let (mut controller, _) = controller();
        controller.activate_project("p1").await.unwrap();

        assert!(controller.apply_theme_preset("p1", "neon").is_err());
        assert!(!controller.state("p1").unwrap().is_dirty);

        controller.apply_theme_preset("p1", "nature").unwrap();
        let state = controller.state("p1").unwrap();
        assert!(state.is_dirty);
        assert_eq!(state.draft_document.theme, ThemeTokens::preset("nature"));
    }

    #[tokio::test]
    async fn test_edits_require_cached_state() {
        let (mut controller, _) = controller();
        assert!(controller.record_edit("ghost", SurveyDocument::starter()).is_err());
        assert!(controller.persist("ghost").await.is_err());
    }
}
