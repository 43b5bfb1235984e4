// SPDX-License-Identifier: MIT

//! Shared helpers for calendar-month arithmetic.

use chrono::{Datelike, Months, NaiveDate};

/// "YYYY-MM" grouping key for a date.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Human label for a month, e.g. "March 2025".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// The same day `months` calendar months earlier, clamping the day when the
/// target month is shorter (saturates at the calendar boundary).
pub fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// First day of the date's month.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the date's month.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_day_of_month(date);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    next.signed_duration_since(first).num_days() as u32
}
