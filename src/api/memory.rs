//! In-process document store
//!
//! Backs tests and offline use. Clones share the same contents, so a test can
//! keep a handle to inject failures while a controller owns another.

use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::store::{DocumentStore, StoreError, StoredDocument};
use crate::participant::ResponseRecord;

#[derive(Debug, Default)]
struct MemoryState {
    documents: BTreeMap<String, StoredDocument>,
    responses: BTreeMap<String, ResponseRecord>,
    offline: bool,
    lightweight_reads: bool,
    full_reads_fail: bool,
    write_delay: Option<Duration>,
    put_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn online(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock()?;
        if state.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(state)
    }

    /// Seed a document without going through `put`
    pub fn insert(&self, document: StoredDocument) {
        if let Ok(mut state) = self.state.lock() {
            state.documents.insert(document.project.id.clone(), document);
        }
    }

    pub fn document(&self, project_id: &str) -> Option<StoredDocument> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.documents.get(project_id).cloned())
    }

    pub fn responses(&self) -> BTreeMap<String, ResponseRecord> {
        self.state
            .lock()
            .map(|state| state.responses.clone())
            .unwrap_or_default()
    }

    /// Every call fails as unreachable while set
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    /// Plain reads strip preloaded images down to their count
    pub fn set_lightweight_reads(&self, lightweight: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.lightweight_reads = lightweight;
        }
    }

    pub fn set_full_reads_fail(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.full_reads_fail = fail;
        }
    }

    /// Delay applied before each write lands
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        if let Ok(mut state) = self.state.lock() {
            state.write_delay = delay;
        }
    }

    /// Number of writes that reached the store
    pub fn put_count(&self) -> usize {
        self.state.lock().map(|state| state.put_count).unwrap_or(0)
    }
}

fn lightweight(mut document: StoredDocument) -> StoredDocument {
    let config = &mut document.project.image_dataset_config;
    if let Some(images) = config.preloaded_images.take() {
        config.preloaded_images_count = Some(images.len());
    }
    document
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, project_id: &str) -> Result<StoredDocument, StoreError> {
        let state = self.online()?;
        let document = state
            .documents
            .get(project_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))?;

        if state.lightweight_reads {
            Ok(lightweight(document))
        } else {
            Ok(document)
        }
    }

    async fn fetch_full(&self, project_id: &str) -> Result<StoredDocument, StoreError> {
        let state = self.online()?;
        if state.full_reads_fail {
            return Err(StoreError::Timeout);
        }
        state
            .documents
            .get(project_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))
    }

    async fn put(&self, project_id: &str, document: &StoredDocument) -> Result<(), StoreError> {
        let delay = self.online()?.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.online()?;
        state
            .documents
            .insert(project_id.to_string(), document.clone());
        state.put_count += 1;
        debug!("Memory store holds {} documents", state.documents.len());
        Ok(())
    }

    async fn delete(&self, project_id: &str) -> Result<(), StoreError> {
        let mut state = self.online()?;
        state
            .documents
            .remove(project_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let state = self.online()?;
        Ok(state.documents.keys().cloned().collect())
    }

    async fn append_response(&self, record: &ResponseRecord) -> Result<String, StoreError> {
        let mut state = self.online()?;
        let key = record.storage_key();
        state.responses.insert(key.clone(), record.clone());
        Ok(key)
    }
}
