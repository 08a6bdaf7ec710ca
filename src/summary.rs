use crate::calendar::{CalendarDay, week_window};
use crate::model::ProgressEntry;
use crate::streak::streak;
use crate::weekly::{WeeklyProgress, weekly_counts};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the dashboard shows: the streak and this week's bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub today: CalendarDay,
    pub streak: u32,
    pub week: WeeklyProgress,
    pub total_this_week: u32,
}

impl ProgressSummary {
    pub fn compute<Tz: TimeZone>(entries: &[ProgressEntry], now: &DateTime<Tz>) -> Self {
        let week = weekly_counts(entries, &week_window(now));
        Self {
            today: crate::calendar::to_calendar_day(now),
            streak: streak(entries, now),
            total_this_week: week.total(),
            week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: CalendarDay,
    pub completed: u32,
}

/// Completions per day over the whole record, oldest first.
pub fn daily_history(entries: &[ProgressEntry]) -> Vec<HistoryPoint> {
    let mut per_day: BTreeMap<CalendarDay, u32> = BTreeMap::new();
    for entry in entries {
        *per_day.entry(entry.date).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, completed)| HistoryPoint { date, completed })
        .collect()
}
