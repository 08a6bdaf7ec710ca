use super::{PersistenceError, PersistenceResult, TrackerDocument, TrackerStore};
use std::sync::Mutex;

/// Keeps the document in process memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<TrackerDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackerStore for MemoryStore {
    fn save_document(&self, document: &TrackerDocument) -> PersistenceResult<()> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?;
        *guard = Some(document.clone());
        Ok(())
    }

    fn load_document(&self) -> PersistenceResult<Option<TrackerDocument>> {
        let guard = self
            .document
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?;
        Ok(guard.clone())
    }
}
