use crate::model::Exercise;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

pub const DEFAULT_TOLERANCE_SECS: i64 = 60;
pub const DEFAULT_REMINDER_BODY: &str = "It's time for your scheduled exercise.";

/// One (exercise, due instant) pair that has already been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiredKey {
    pub exercise_id: i64,
    pub due: DateTime<Utc>,
}

/// Reminders already delivered this session.
///
/// Keys whose due instant is further back than the tolerance window can never
/// match again and are pruned on every check, so the set stays bounded by the
/// number of schedules due around "now".
#[derive(Debug, Clone, Default)]
pub struct FiredKeys {
    keys: HashSet<FiredKey>,
}

impl FiredKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &FiredKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn insert(&mut self, key: FiredKey) -> bool {
        self.keys.insert(key)
    }

    pub fn prune(&mut self, now: DateTime<Utc>, tolerance: Duration) {
        let horizon = now - tolerance;
        self.keys.retain(|key| key.due >= horizon);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub exercise_id: i64,
    pub name: String,
    pub description: String,
    pub due: DateTime<Utc>,
}

impl Reminder {
    pub fn title(&self) -> String {
        format!("Physio time: {}", self.name)
    }

    pub fn body(&self) -> &str {
        if self.description.trim().is_empty() {
            DEFAULT_REMINDER_BODY
        } else {
            &self.description
        }
    }
}

/// Exercises due within `tolerance` of `now` that have not fired yet.
///
/// Every returned reminder's key is recorded in `fired` before returning.
pub fn check_due<Tz: TimeZone>(
    exercises: &[Exercise],
    now: &DateTime<Tz>,
    tolerance: Duration,
    fired: &mut FiredKeys,
) -> Vec<Reminder> {
    let now_utc = now.with_timezone(&Utc);
    fired.prune(now_utc, tolerance);

    let mut due_now = Vec::new();
    for exercise in exercises {
        let schedule = match exercise.schedule() {
            Some(Ok(schedule)) => schedule,
            Some(Err(err)) => {
                debug!(exercise_id = exercise.id, %err, "skipping unreadable schedule");
                continue;
            }
            None => continue,
        };
        let Some(due) = schedule.resolve(now) else {
            debug!(exercise_id = exercise.id, "schedule does not exist in local time today");
            continue;
        };
        if (now_utc - due).abs() > tolerance {
            continue;
        }
        let key = FiredKey {
            exercise_id: exercise.id,
            due,
        };
        if fired.insert(key) {
            due_now.push(Reminder {
                exercise_id: exercise.id,
                name: exercise.name.clone(),
                description: exercise.description.clone(),
                due,
            });
        }
    }
    due_now
}

/// Delivers user-visible alerts.
pub trait Notifier: Send + Sync {
    /// Without permission no reminder is checked or delivered.
    fn is_permitted(&self) -> bool {
        true
    }

    fn notify(&self, title: &str, body: &str);
}

/// Writes reminders to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(title, body, "exercise reminder");
    }
}

pub fn deliver(notifier: &dyn Notifier, reminders: &[Reminder]) {
    for reminder in reminders {
        notifier.notify(&reminder.title(), reminder.body());
    }
}
