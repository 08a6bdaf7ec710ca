use chrono::{DateTime, FixedOffset, TimeZone};
use physio_tracker::{CalendarDay, ProgressEntry, streak};

fn now(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
}

fn entry(id: i64, date: &str) -> ProgressEntry {
    ProgressEntry {
        id,
        exercise_id: 1,
        date: CalendarDay::parse(date).unwrap(),
    }
}

#[test]
fn no_entries_means_no_streak() {
    assert_eq!(streak(&[], &now(2025, 6, 4, 9)), 0);
    assert_eq!(streak(&[], &now(2000, 1, 1, 0)), 0);
}

#[test]
fn three_consecutive_days_ending_today() {
    let entries = vec![
        entry(1, "2025-06-02"),
        entry(2, "2025-06-03"),
        entry(3, "2025-06-04"),
    ];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 18)), 3);
}

#[test]
fn removing_yesterday_breaks_the_run() {
    let entries = vec![entry(1, "2025-06-02"), entry(3, "2025-06-04")];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 18)), 1);
}

#[test]
fn today_is_required() {
    let entries = vec![entry(1, "2025-06-02"), entry(2, "2025-06-03")];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 7)), 0);
}

#[test]
fn same_day_duplicates_do_not_inflate() {
    let entries = vec![
        entry(1, "2025-06-04"),
        entry(2, "2025-06-04"),
        entry(3, "2025-06-04"),
        entry(4, "2025-06-03"),
    ];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 12)), 2);
}

#[test]
fn future_entries_are_ignored() {
    let entries = vec![
        entry(1, "2025-06-04"),
        entry(2, "2025-06-05"),
        entry(3, "2025-06-06"),
    ];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 12)), 1);
}

#[test]
fn streak_spans_month_and_year_boundaries() {
    let entries = vec![
        entry(1, "2024-12-30"),
        entry(2, "2024-12-31"),
        entry(3, "2025-01-01"),
        entry(4, "2025-01-02"),
    ];
    assert_eq!(streak(&entries, &now(2025, 1, 2, 20)), 4);
}

#[test]
fn entry_order_does_not_matter() {
    let entries = vec![
        entry(3, "2025-06-04"),
        entry(1, "2025-06-02"),
        entry(2, "2025-06-03"),
    ];
    assert_eq!(streak(&entries, &now(2025, 6, 4, 9)), 3);
}
