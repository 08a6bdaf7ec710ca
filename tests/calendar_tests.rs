use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Weekday};
use physio_tracker::calendar::{CalendarDay, to_calendar_day, week_window};

fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_hours * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

fn day(y: i32, m: u32, d: u32) -> CalendarDay {
    CalendarDay::from_ymd(y, m, d).unwrap()
}

#[test]
fn calendar_day_is_zero_padded() {
    let moment = at(0, 2025, 3, 9, 8, 15);
    assert_eq!(to_calendar_day(&moment).to_string(), "2025-03-09");
}

#[test]
fn calendar_day_uses_the_moments_own_offset() {
    // 23:30 at UTC-5 is already the next day in UTC.
    let late_evening = at(-5, 2025, 6, 4, 23, 30);
    assert_eq!(to_calendar_day(&late_evening), day(2025, 6, 4));
    // 00:30 at UTC+9 is still the previous day in UTC.
    let early_morning = at(9, 2025, 6, 5, 0, 30);
    assert_eq!(to_calendar_day(&early_morning), day(2025, 6, 5));
}

#[test]
fn moments_on_the_same_local_day_share_a_key() {
    let morning = at(2, 2025, 6, 4, 0, 0);
    let night = at(2, 2025, 6, 4, 23, 59);
    assert_eq!(to_calendar_day(&morning), to_calendar_day(&night));
}

#[test]
fn formatting_a_parsed_canonical_day_is_idempotent() {
    let offset = FixedOffset::east_opt(3600).unwrap();
    for raw in ["2025-01-01", "2024-02-29", "2025-12-31", "2025-06-08"] {
        let parsed = CalendarDay::parse(raw).unwrap();
        let midnight = parsed.start_of_day(&offset).unwrap();
        assert_eq!(to_calendar_day(&midnight).to_string(), raw);
    }
}

#[test]
fn calendar_day_serializes_as_canonical_string() {
    let json = serde_json::to_string(&day(2025, 6, 4)).unwrap();
    assert_eq!(json, "\"2025-06-04\"");
    let back: CalendarDay = serde_json::from_str(&json).unwrap();
    assert_eq!(back, day(2025, 6, 4));
    assert!(serde_json::from_str::<CalendarDay>("\"2025-6-4\"").is_err());
    assert!(serde_json::from_str::<CalendarDay>("\"2025-02-30\"").is_err());
}

#[test]
fn week_window_starts_monday_for_every_weekday() {
    // 2025-06-02 is a Monday; walk the whole week plus the next Monday.
    for offset in 0..8 {
        let reference = at(0, 2025, 6, 2, 15, 0) + Duration::days(offset);
        let window = week_window(&reference);
        let days = window.days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].weekday(), Weekday::Mon);
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
        assert!(window.contains(to_calendar_day(&reference)));
    }
}

#[test]
fn week_window_on_sunday_looks_back_to_monday() {
    let sunday = at(0, 2025, 6, 8, 21, 0);
    let window = week_window(&sunday);
    assert_eq!(window.monday(), day(2025, 6, 2));
    assert_eq!(window.sunday(), day(2025, 6, 8));
}

#[test]
fn week_window_crosses_year_boundary() {
    // Sunday 2025-01-05 belongs to the week starting Monday 2024-12-30.
    let window = week_window(&at(0, 2025, 1, 5, 9, 0));
    assert_eq!(window.monday(), day(2024, 12, 30));
    assert_eq!(window.monday().date().year(), 2024);
    assert_eq!(window.sunday(), day(2025, 1, 5));
}

#[test]
fn week_window_across_leap_day() {
    let window = week_window(&at(0, 2024, 2, 29, 12, 0));
    let rendered: Vec<String> = window.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "2024-02-26",
            "2024-02-27",
            "2024-02-28",
            "2024-02-29",
            "2024-03-01",
            "2024-03-02",
            "2024-03-03"
        ]
    );
}
