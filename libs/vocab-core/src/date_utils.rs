//! Date utilities for daily reset hour handling.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

/// Study day that `now` belongs to.
///
/// If the current hour is before the reset hour, "today" is actually
/// "yesterday" from a study perspective. This lets late-night practice count
/// towards the previous day.
///
/// # Arguments
/// * `daily_reset_hour` - Hour of day (0-23, UTC) when a new study day begins
pub fn study_day(now: DateTime<Utc>, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        // Before reset hour, consider it still "yesterday"
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// Whether `later` is the calendar day right after `earlier`.
pub fn is_day_after(earlier: NaiveDate, later: NaiveDate) -> bool {
    earlier.succ_opt() == Some(later)
}
