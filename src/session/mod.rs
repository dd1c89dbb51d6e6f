//! Session state cache
//!
//! Per-project editing state that lives for one editing session. Every write is
//! mirrored immediately so a restarted front end resumes with identical state.

pub mod mirror;
pub mod state;

pub use mirror::{FileMirror, MemoryMirror, SessionMirror};
pub use state::ProjectEditingState;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Whether a mirrored key can name a project
///
/// Empty keys and the literal strings "undefined" and "null" are artifacts of
/// states recorded without an active project.
pub fn is_valid_project_key(key: &str) -> bool {
    !key.trim().is_empty() && key != "undefined" && key != "null"
}

pub struct SessionCache {
    states: HashMap<String, ProjectEditingState>,
    mirror: Box<dyn SessionMirror>,
}

impl SessionCache {
    /// Start an empty cache without reading the mirror
    pub fn new(mirror: Box<dyn SessionMirror>) -> Self {
        Self {
            states: HashMap::new(),
            mirror,
        }
    }

    /// Rebuild the cache from its mirror, dropping malformed entries
    pub fn load(mirror: Box<dyn SessionMirror>) -> Self {
        let entries = match mirror.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Ignoring unreadable session mirror: {:#}", err);
                Map::new()
            }
        };

        let mut states = HashMap::new();
        for (key, value) in entries {
            if !is_valid_project_key(&key) {
                warn!("Skipping session state with invalid project key: {:?}", key);
                continue;
            }
            match serde_json::from_value::<ProjectEditingState>(value) {
                Ok(state) => {
                    states.insert(key, state);
                }
                Err(err) => warn!("Skipping malformed session state for '{}': {}", key, err),
            }
        }

        debug!("Loaded {} project states from session mirror", states.len());
        Self { states, mirror }
    }

    pub fn get(&self, project_id: &str) -> Option<&ProjectEditingState> {
        self.states.get(project_id)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.states.contains_key(project_id)
    }

    /// Replace a project's state and mirror the cache
    pub fn put(&mut self, project_id: &str, state: ProjectEditingState) -> Result<()> {
        if !is_valid_project_key(project_id) {
            anyhow::bail!("Refusing to cache state under invalid project id {:?}", project_id);
        }
        self.states.insert(project_id.to_string(), state);
        self.flush()
    }

    /// Drop a project's state from memory and from the mirror
    pub fn remove(&mut self, project_id: &str) -> Result<Option<ProjectEditingState>> {
        let removed = self.states.remove(project_id);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Forget every cached state
    pub fn clear(&mut self) -> Result<()> {
        self.states.clear();
        self.flush()
    }

    /// Cached project ids in sorted order
    pub fn project_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.states.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn flush(&self) -> Result<()> {
        let mut entries = Map::new();
        for (id, state) in &self.states {
            let value = serde_json::to_value(state)
                .with_context(|| format!("Failed to serialize session state for '{}'", id))?;
            entries.insert(id.clone(), value);
        }
        self.mirror.store(&entries).context("Failed to mirror session state")
    }
}
