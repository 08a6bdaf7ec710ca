use crate::calendar::to_calendar_day;
use crate::clock::Clock;
use crate::model::{
    Exercise, ExerciseFilter, ExercisePatch, NewExercise, NewProgressEntry, NewScheduleEntry,
    ProgressEntry, ScheduleEntry, ScheduleEntryPatch, ValidationError, sample_exercises,
};
use crate::persistence::{PersistenceError, Record, RecordKind, TrackerDocument, TrackerStore};
use crate::summary::{HistoryPoint, ProgressSummary, daily_history};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("{kind} record {id} not found")]
    NotFound { kind: RecordKind, id: i64 },
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Shared handle used by the HTTP layer and the reminder task.
#[cfg(feature = "http_api")]
pub type SharedTracker = Arc<parking_lot::RwLock<Tracker>>;

/// Millisecond-timestamp id, bumped past any id already in `records`.
fn next_id<R: Record>(records: &[R], now_millis: i64) -> i64 {
    let mut id = now_millis;
    while records.iter().any(|record| record.id() == id) {
        id += 1;
    }
    id
}

fn position<R: Record>(records: &[R], id: i64) -> TrackerResult<usize> {
    records
        .iter()
        .position(|record| record.id() == id)
        .ok_or(TrackerError::NotFound { kind: R::KIND, id })
}

/// The in-memory collections plus the store they are written through to.
///
/// Every mutation is applied to a copy, persisted, and only then made
/// visible, so a failed write leaves the previous state in place.
pub struct Tracker {
    document: TrackerDocument,
    store: Box<dyn TrackerStore>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    /// Loads the stored document. An empty store is seeded with the sample
    /// exercises when `seed_samples` is set.
    pub fn open(
        store: Box<dyn TrackerStore>,
        clock: Arc<dyn Clock>,
        seed_samples: bool,
    ) -> TrackerResult<Self> {
        let document = store.load_document()?.unwrap_or_default();
        let mut tracker = Self {
            document,
            store,
            clock,
        };
        if seed_samples && tracker.document.exercises.is_empty() {
            let mut seeded = tracker.document.clone();
            seeded.exercises = sample_exercises();
            tracker.commit(seeded)?;
            info!("sample exercises added");
        }
        Ok(tracker)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn document(&self) -> &TrackerDocument {
        &self.document
    }

    fn commit(&mut self, next: TrackerDocument) -> TrackerResult<()> {
        if let Err(err) = self.store.save_document(&next) {
            warn!(%err, "store write failed, keeping previous state");
            return Err(err.into());
        }
        self.document = next;
        Ok(())
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.document.exercises
    }

    pub fn exercises_matching(&self, filter: &ExerciseFilter) -> Vec<Exercise> {
        self.document
            .exercises
            .iter()
            .filter(|exercise| filter.matches(exercise))
            .cloned()
            .collect()
    }

    pub fn find_exercise(&self, id: i64) -> Option<&Exercise> {
        self.document.exercises.iter().find(|exercise| exercise.id == id)
    }

    pub fn create_exercise(&mut self, new: NewExercise) -> TrackerResult<Exercise> {
        let id = next_id(&self.document.exercises, self.clock.now_millis());
        let exercise = new.into_exercise(id)?;
        let mut next = self.document.clone();
        next.exercises.push(exercise.clone());
        self.commit(next)?;
        info!(id, name = %exercise.name, "exercise created");
        Ok(exercise)
    }

    pub fn update_exercise(&mut self, id: i64, patch: &ExercisePatch) -> TrackerResult<Exercise> {
        let idx = position(&self.document.exercises, id)?;
        let mut next = self.document.clone();
        patch.apply(&mut next.exercises[idx])?;
        let updated = next.exercises[idx].clone();
        self.commit(next)?;
        info!(id, "exercise updated");
        Ok(updated)
    }

    /// Progress and schedule entries pointing at the exercise are kept.
    pub fn delete_exercise(&mut self, id: i64) -> TrackerResult<()> {
        let idx = position(&self.document.exercises, id)?;
        let mut next = self.document.clone();
        next.exercises.remove(idx);
        self.commit(next)?;
        info!(id, "exercise deleted");
        Ok(())
    }

    pub fn schedule_entries(&self) -> &[ScheduleEntry] {
        &self.document.schedule
    }

    pub fn create_schedule_entry(&mut self, new: NewScheduleEntry) -> TrackerResult<ScheduleEntry> {
        let id = next_id(&self.document.schedule, self.clock.now_millis());
        let entry = new.into_entry(id)?;
        let mut next = self.document.clone();
        next.schedule.push(entry.clone());
        self.commit(next)?;
        info!(id, exercise_id = entry.exercise_id, "schedule entry created");
        Ok(entry)
    }

    pub fn update_schedule_entry(
        &mut self,
        id: i64,
        patch: &ScheduleEntryPatch,
    ) -> TrackerResult<ScheduleEntry> {
        let idx = position(&self.document.schedule, id)?;
        let mut next = self.document.clone();
        patch.apply(&mut next.schedule[idx])?;
        let updated = next.schedule[idx].clone();
        self.commit(next)?;
        Ok(updated)
    }

    pub fn delete_schedule_entry(&mut self, id: i64) -> TrackerResult<()> {
        let idx = position(&self.document.schedule, id)?;
        let mut next = self.document.clone();
        next.schedule.remove(idx);
        self.commit(next)
    }

    pub fn progress(&self) -> &[ProgressEntry] {
        &self.document.progress
    }

    /// The exercise id is not checked against existing exercises.
    pub fn record_progress(&mut self, new: NewProgressEntry) -> TrackerResult<ProgressEntry> {
        let now = self.clock.now();
        let entry = ProgressEntry {
            id: next_id(&self.document.progress, now.timestamp_millis()),
            exercise_id: new.exercise_id,
            date: new.date.unwrap_or_else(|| to_calendar_day(&now)),
        };
        let mut next = self.document.clone();
        next.progress.push(entry.clone());
        self.commit(next)?;
        info!(
            id = entry.id,
            exercise_id = entry.exercise_id,
            date = %entry.date,
            "completion recorded"
        );
        Ok(entry)
    }

    pub fn delete_progress(&mut self, id: i64) -> TrackerResult<()> {
        let idx = position(&self.document.progress, id)?;
        let mut next = self.document.clone();
        next.progress.remove(idx);
        self.commit(next)
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::compute(&self.document.progress, &self.clock.now())
    }

    pub fn history(&self) -> Vec<HistoryPoint> {
        daily_history(&self.document.progress)
    }
}
