use crate::calendar::{CalendarDay, WEEKDAYS, WeekWindow};
use crate::model::ProgressEntry;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// Serialized as the short name, `Mon`..`Sun`.
    pub day: Weekday,
    pub date: CalendarDay,
    pub sessions: u32,
}

/// Completions per day for one Monday..Sunday window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyProgress {
    days: [DayCount; 7],
}

impl WeeklyProgress {
    pub fn days(&self) -> &[DayCount; 7] {
        &self.days
    }

    pub fn sessions_on(&self, date: CalendarDay) -> Option<u32> {
        self.days
            .iter()
            .find(|count| count.date == date)
            .map(|count| count.sessions)
    }

    pub fn total(&self) -> u32 {
        self.days.iter().map(|count| count.sessions).sum()
    }
}

/// Entries dated outside `window` are ignored. Every entry counts, so two
/// completions on one day give that day 2 sessions.
pub fn weekly_counts(entries: &[ProgressEntry], window: &WeekWindow) -> WeeklyProgress {
    let mut days: [DayCount; 7] = std::array::from_fn(|idx| DayCount {
        day: WEEKDAYS[idx],
        date: window.days()[idx],
        sessions: 0,
    });
    for entry in entries {
        if let Some(idx) = window.position(entry.date) {
            days[idx].sessions += 1;
        }
    }
    WeeklyProgress { days }
}
