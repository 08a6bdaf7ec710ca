use crate::model::{Exercise, ProgressEntry, ScheduleEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store lock poisoned")]
    Poisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The three collections kept by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Exercises,
    Schedule,
    Progress,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Exercises => "exercises",
            RecordKind::Schedule => "schedule",
            RecordKind::Progress => "progress",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Record {
    const KIND: RecordKind;

    fn id(&self) -> i64;
}

impl Record for Exercise {
    const KIND: RecordKind = RecordKind::Exercises;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for ScheduleEntry {
    const KIND: RecordKind = RecordKind::Schedule;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for ProgressEntry {
    const KIND: RecordKind = RecordKind::Progress;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Everything the tracker persists, in the on-disk JSON layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerDocument {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
}

pub trait TrackerStore: Send + Sync {
    fn save_document(&self, document: &TrackerDocument) -> PersistenceResult<()>;
    /// `None` when nothing has been stored yet.
    fn load_document(&self) -> PersistenceResult<Option<TrackerDocument>>;
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileStore, write_progress_csv};
pub use memory::MemoryStore;
