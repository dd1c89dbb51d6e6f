//! Durable mirrors for the session state cache
//!
//! A mirror holds the raw JSON of every cached project state so that a restarted
//! front end can rebuild the cache. The file mirror is the session-scoped store
//! of the command-line front end; the memory mirror backs tests and embedders.

use anyhow::{Context, Result};
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait SessionMirror: Send + Sync {
    /// Read every mirrored entry, keyed by project id
    fn load(&self) -> Result<Map<String, Value>>;

    /// Replace the mirrored entries
    fn store(&self, entries: &Map<String, Value>) -> Result<()>;
}

/// Mirror kept in process memory
///
/// Clones share the same entries, which lets a test inspect what a cache wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    entries: Arc<Mutex<Map<String, Value>>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Map<String, Value>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

impl SessionMirror for MemoryMirror {
    fn load(&self) -> Result<Map<String, Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Session mirror lock poisoned"))?;
        Ok(entries.clone())
    }

    fn store(&self, entries: &Map<String, Value>) -> Result<()> {
        let mut current = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Session mirror lock poisoned"))?;
        *current = entries.clone();
        Ok(())
    }
}

/// Mirror stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionMirror for FileMirror {
    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            debug!("No session mirror at {:?}", self.path);
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session mirror: {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session mirror: {:?}", self.path))?;
        match value {
            Value::Object(entries) => Ok(entries),
            _ => anyhow::bail!("Session mirror {:?} is not a JSON object", self.path),
        }
    }

    fn store(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let content = serde_json::to_string_pretty(entries)
            .context("Failed to serialize session mirror")?;

        // Readers never observe a partially written mirror
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write session mirror: {:?}", tmp_path))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace session mirror: {:?}", self.path))?;

        debug!("Mirrored {} project states to {:?}", entries.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_file_mirror_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = FileMirror::new(temp_dir.path().join("nested").join("session.json"));

        assert!(mirror.load().unwrap().is_empty());

        let mut entries = Map::new();
        entries.insert("p1".to_string(), json!({ "isDirty": true }));
        mirror.store(&entries).unwrap();

        assert_eq!(mirror.load().unwrap(), entries);
    }

    #[test]
    fn test_file_mirror_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(FileMirror::new(path).load().is_err());
    }

    #[test]
    fn test_memory_mirror_clones_share_entries() {
        let mirror = MemoryMirror::new();
        let observer = mirror.clone();

        let mut entries = Map::new();
        entries.insert("p1".to_string(), json!(1));
        mirror.store(&entries).unwrap();

        assert_eq!(observer.snapshot(), entries);
    }
}
