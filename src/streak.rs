use crate::calendar::{CalendarDay, to_calendar_day};
use crate::model::ProgressEntry;
use chrono::{DateTime, TimeZone};
use std::collections::HashSet;

/// Consecutive days with at least one completion, ending today.
///
/// Today is required: with no entry for today the streak is 0 even if
/// yesterday was completed. Entries dated after today never count.
pub fn streak<Tz: TimeZone>(entries: &[ProgressEntry], now: &DateTime<Tz>) -> u32 {
    streak_ending(entries, to_calendar_day(now))
}

pub fn streak_ending(entries: &[ProgressEntry], today: CalendarDay) -> u32 {
    let completed: HashSet<CalendarDay> = entries.iter().map(|entry| entry.date).collect();
    let mut count = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor {
        if !completed.contains(&day) {
            break;
        }
        count += 1;
        cursor = day.pred_opt();
    }
    count
}
