// Utility functions
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Today's date on the local wall clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First and last calendar day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    // Day 28 exists in every month; four days later is always next month.
    let next_month = first + Duration::days(27 + 4);
    let last = next_month.with_day(1).unwrap_or(next_month) - Duration::days(1);
    (first, last)
}

/// `[date - 365 days, date]`.
pub fn trailing_year(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (date - Duration::days(365), date)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
