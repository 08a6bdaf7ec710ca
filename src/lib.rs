pub mod calendar;
pub mod clock;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod model;
pub mod notifier;
pub mod persistence;
#[cfg(feature = "http_api")]
pub mod quote;
#[cfg(feature = "http_api")]
pub mod reminder;
pub mod schedule_time;
pub mod streak;
pub mod summary;
pub mod tracker;
pub mod weekly;

pub use calendar::{CalendarDay, WeekWindow, to_calendar_day, week_window};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use model::{
    Category, Difficulty, Exercise, ExerciseDuration, ExerciseFilter, ExercisePatch, NewExercise,
    NewProgressEntry, NewScheduleEntry, ProgressEntry, ScheduleEntry, ScheduleEntryPatch,
    ValidationError,
};
pub use notifier::{FiredKeys, LogNotifier, Notifier, Reminder, check_due};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    JsonFileStore, MemoryStore, PersistenceError, TrackerDocument, TrackerStore,
    write_progress_csv,
};
pub use schedule_time::ScheduleTime;
pub use streak::streak;
pub use summary::{HistoryPoint, ProgressSummary, daily_history};
pub use tracker::{Tracker, TrackerError};
pub use weekly::{DayCount, WeeklyProgress, weekly_counts};
