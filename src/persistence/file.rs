use super::{PersistenceResult, TrackerDocument, TrackerStore};
use crate::model::ProgressEntry;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pretty-printed JSON document on disk.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// failed write never truncates the existing document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TrackerStore for JsonFileStore {
    fn save_document(&self, document: &TrackerDocument) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&temp)?);
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.flush()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn load_document(&self) -> PersistenceResult<Option<TrackerDocument>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressCsvRecord {
    id: i64,
    exercise_id: i64,
    date: String,
}

impl From<&ProgressEntry> for ProgressCsvRecord {
    fn from(entry: &ProgressEntry) -> Self {
        Self {
            id: entry.id,
            exercise_id: entry.exercise_id,
            date: entry.date.to_string(),
        }
    }
}

/// Writes `id,exerciseId,date` rows with a header.
pub fn write_progress_csv<W: Write>(entries: &[ProgressEntry], writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for entry in entries {
        writer.serialize(ProgressCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}
