use serde::{Deserialize, Serialize};

use crate::survey::{ImageDatasetConfig, Project, SurveyDocument};

/// Editing state of one project within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEditingState {
    /// Working copy of the project record
    pub project: Project,
    pub draft_document: SurveyDocument,
    pub last_persisted_document: SurveyDocument,
    pub is_dirty: bool,
    #[serde(default)]
    pub active_tab_index: usize,
    /// Image dataset edits waiting for the next persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_image_dataset: Option<ImageDatasetConfig>,
}

impl ProjectEditingState {
    /// State for a project freshly loaded from the store
    pub fn fresh(project: Project, document: SurveyDocument) -> Self {
        Self {
            project,
            last_persisted_document: document.clone(),
            draft_document: document,
            is_dirty: false,
            active_tab_index: 0,
            pending_image_dataset: None,
        }
    }

    pub fn image_dataset_dirty(&self) -> bool {
        self.pending_image_dataset.is_some()
    }

    /// Recompute `is_dirty` from the draft, the persisted baseline and the
    /// image dataset flag
    pub fn refresh_dirty(&mut self) -> bool {
        self.is_dirty =
            self.draft_document != self.last_persisted_document || self.image_dataset_dirty();
        self.is_dirty
    }

    pub fn replace_draft(&mut self, draft: SurveyDocument) -> bool {
        self.draft_document = draft;
        self.refresh_dirty()
    }

    /// Project record as it should be written, with staged dataset edits applied
    pub fn project_for_persist(&self) -> Project {
        let mut project = self.project.clone();
        if let Some(config) = &self.pending_image_dataset {
            project.image_dataset_config = config.clone();
        }
        project
    }

    /// Fold a successful write of `written` into the state
    pub fn mark_persisted(&mut self, written: &SurveyDocument, project: Project) {
        self.last_persisted_document = written.clone();
        self.project = project;
        self.pending_image_dataset = None;
        self.refresh_dirty();
    }
}
