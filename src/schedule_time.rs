use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::str::FromStr;
use thiserror::Error;

const LOCAL_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const TIME_OF_DAY_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised schedule '{0}' (expected HH:MM, YYYY-MM-DDTHH:MM or RFC 3339)")]
pub struct ScheduleParseError(String);

/// When an exercise is scheduled, as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTime {
    /// Carries its own offset.
    Absolute(DateTime<FixedOffset>),
    /// A wall-clock date and time in the reader's offset.
    Local(NaiveDateTime),
    /// A time of day, due every day.
    Daily(NaiveTime),
}

impl ScheduleTime {
    /// The instant this schedule is due relative to `now`.
    ///
    /// Daily schedules resolve to today's occurrence in `now`'s offset. Returns
    /// `None` when the wall-clock time does not exist in that zone.
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let tz = now.timezone();
        match self {
            ScheduleTime::Absolute(at) => Some(at.with_timezone(&Utc)),
            ScheduleTime::Local(naive) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|at| at.with_timezone(&Utc)),
            ScheduleTime::Daily(time) => tz
                .from_local_datetime(&now.date_naive().and_time(*time))
                .earliest()
                .map(|at| at.with_timezone(&Utc)),
        }
    }
}

impl FromStr for ScheduleTime {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(input) {
            return Ok(ScheduleTime::Absolute(at));
        }
        for format in LOCAL_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(ScheduleTime::Local(naive));
            }
        }
        for format in TIME_OF_DAY_FORMATS {
            if let Ok(time) = NaiveTime::parse_from_str(input, format) {
                return Ok(ScheduleTime::Daily(time));
            }
        }
        Err(ScheduleParseError(s.to_string()))
    }
}
