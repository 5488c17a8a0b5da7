// Date utility functions
// Day bucketing and local-midnight math for the calendar grid

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};

/// Total minutes in a displayed calendar day
pub const DAY_MINUTES: i64 = 24 * 60;

/// Local calendar date a timestamp falls on; the bucketing key for all
/// per-day grouping.
pub fn local_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

/// Canonical `YYYY-MM-DD` key for a day
pub fn format_day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Local midnight at the start of `day`
pub fn day_start(day: NaiveDate) -> DateTime<Local> {
    match Local.from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap()) {
        chrono::LocalResult::Single(start) | chrono::LocalResult::Ambiguous(start, _) => start,
        // Midnight skipped by a DST transition: take the earliest valid time
        chrono::LocalResult::None => {
            let fallback = day.and_hms_opt(1, 0, 0).unwrap();
            Local
                .from_local_datetime(&fallback)
                .earliest()
                .unwrap_or_else(Local::now)
        }
    }
}

/// Monday at or before `day`
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Local timestamp for `minutes` past midnight of `day`, with minutes
/// clamped into `[0, DAY_MINUTES]`.
pub fn combine_day_and_minutes(day: NaiveDate, minutes: i64) -> DateTime<Local> {
    let clamped = minutes.clamp(0, DAY_MINUTES);
    day_start(day) + Duration::minutes(clamped)
}

/// Minutes between a timestamp and local midnight of `day`.
///
/// May be negative or exceed `DAY_MINUTES` for timestamps outside the day;
/// callers clamp when clipping to the displayed grid.
pub fn minutes_since_day_start(timestamp: DateTime<Utc>, day: NaiveDate) -> i64 {
    (timestamp.with_timezone(&Local) - day_start(day)).num_minutes()
}

/// True when the timestamp's local calendar date is `day`
pub fn is_same_local_day(timestamp: DateTime<Utc>, day: NaiveDate) -> bool {
    local_day(timestamp) == day
}

/// Header label for a day column, e.g. "Wed, Jan 10"
pub fn format_day_header(day: NaiveDate) -> String {
    day.format("%a, %b %-d").to_string()
}

/// Label for the currently visible range.
///
/// Day view shows the full date; week view collapses the year (and month,
/// when both ends share it).
pub fn format_range_label(days: &[NaiveDate]) -> String {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return String::new();
    };

    if days.len() == 1 {
        return first.format("%A, %B %-d, %Y").to_string();
    }

    if first.year() == last.year() && first.month() == last.month() {
        format!(
            "{} - {}",
            first.format("%b %-d"),
            last.format("%-d, %Y")
        )
    } else {
        format!(
            "{} - {}",
            first.format("%b %-d, %Y"),
            last.format("%b %-d, %Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    #[test]
    fn test_day_key_round_trip() {
        let d = day(2024, 1, 10);
        assert_eq!(format_day_key(d), "2024-01-10");
        assert_eq!(parse_day_key("2024-01-10"), Some(d));
        assert_eq!(parse_day_key("not-a-day"), None);
    }

    #[test]
    fn test_start_of_week_is_monday() {
        // 2024-01-10 is a Wednesday
        let monday = start_of_week(day(2024, 1, 10));
        assert_eq!(monday, day(2024, 1, 8));
        assert_eq!(monday.weekday(), Weekday::Mon);

        // A Monday maps to itself
        assert_eq!(start_of_week(day(2024, 1, 8)), day(2024, 1, 8));
        // Sunday belongs to the week starting the previous Monday
        assert_eq!(start_of_week(day(2024, 1, 14)), day(2024, 1, 8));
    }

    #[test]
    fn test_combine_day_and_minutes_clamps() {
        let d = day(2024, 1, 10);
        let start = combine_day_and_minutes(d, -30);
        assert_eq!(start, day_start(d));

        let end = combine_day_and_minutes(d, DAY_MINUTES + 90);
        assert_eq!(end, day_start(d) + Duration::minutes(DAY_MINUTES));
    }

    #[test]
    fn test_minutes_since_day_start_outside_day() {
        let d = day(2024, 1, 10);
        let before = (day_start(d) - Duration::minutes(45)).with_timezone(&Utc);
        assert_eq!(minutes_since_day_start(before, d), -45);

        let after = (day_start(d) + Duration::minutes(DAY_MINUTES + 30)).with_timezone(&Utc);
        assert_eq!(minutes_since_day_start(after, d), DAY_MINUTES + 30);
    }

    #[test]
    fn test_is_same_local_day() {
        let d = day(2024, 1, 10);
        let morning = (day_start(d) + Duration::minutes(9 * 60)).with_timezone(&Utc);
        assert!(is_same_local_day(morning, d));

        let next_day = (day_start(d) + Duration::minutes(DAY_MINUTES + 1)).with_timezone(&Utc);
        assert!(!is_same_local_day(next_day, d));
    }

    #[test]
    fn test_range_label_same_month() {
        let days: Vec<NaiveDate> = (8..=14).map(|dom| day(2024, 1, dom)).collect();
        assert_eq!(format_range_label(&days), "Jan 8 - 14, 2024");
    }

    #[test]
    fn test_range_label_across_years() {
        let days = vec![day(2024, 12, 30), day(2025, 1, 5)];
        assert_eq!(format_range_label(&days), "Dec 30, 2024 - Jan 5, 2025");
    }

    #[test]
    fn test_range_label_single_day() {
        let days = vec![day(2024, 1, 10)];
        assert_eq!(format_range_label(&days), "Wednesday, January 10, 2024");
    }
}
