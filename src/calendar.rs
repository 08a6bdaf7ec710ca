use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Monday-first order used by every week window.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a canonical YYYY-MM-DD calendar day")]
pub struct CalendarDayError {
    input: String,
}

/// A local calendar day, the unit of record for completions.
///
/// Always rendered as `YYYY-MM-DD`; parsing only accepts that exact form so
/// two keys compare equal exactly when they name the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn parse(input: &str) -> Result<Self, CalendarDayError> {
        let invalid = || CalendarDayError {
            input: input.to_string(),
        };
        let date = NaiveDate::parse_from_str(input, DAY_FORMAT).map_err(|_| invalid())?;
        // chrono accepts unpadded fields; the canonical form does not.
        if date.format(DAY_FORMAT).to_string() != input {
            return Err(invalid());
        }
        Ok(Self(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn pred_opt(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn succ_opt(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Midnight of this day in `tz`, or `None` when midnight does not exist there.
    pub fn start_of_day<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.from_local_datetime(&self.0.and_time(NaiveTime::MIN))
            .earliest()
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = CalendarDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Calendar day of `moment` in its own offset. No UTC normalization.
pub fn to_calendar_day<Tz: TimeZone>(moment: &DateTime<Tz>) -> CalendarDay {
    CalendarDay(moment.date_naive())
}

/// The Monday..Sunday week containing a reference moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekWindow {
    days: [CalendarDay; 7],
}

impl WeekWindow {
    pub fn starting(monday: CalendarDay) -> Self {
        let start = monday.date();
        Self {
            days: std::array::from_fn(|idx| CalendarDay(start + Duration::days(idx as i64))),
        }
    }

    pub fn days(&self) -> &[CalendarDay; 7] {
        &self.days
    }

    pub fn monday(&self) -> CalendarDay {
        self.days[0]
    }

    pub fn sunday(&self) -> CalendarDay {
        self.days[6]
    }

    /// Position of `day` in the window, 0 for Monday.
    pub fn position(&self, day: CalendarDay) -> Option<usize> {
        let offset = (day.date() - self.monday().date()).num_days();
        if (0..7).contains(&offset) {
            Some(offset as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.position(day).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.days.iter().copied()
    }
}

pub fn week_window<Tz: TimeZone>(reference: &DateTime<Tz>) -> WeekWindow {
    let today = reference.date_naive();
    let since_monday = today.weekday().num_days_from_monday() as i64;
    WeekWindow::starting(CalendarDay(today - Duration::days(since_monday)))
}
