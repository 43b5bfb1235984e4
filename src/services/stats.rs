// SPDX-License-Identifier: MIT

//! Spend statistics over a user's receipt history.
//!
//! Every function here is a pure computation over rows already fetched from
//! storage, with "now" injected by the caller. Empty histories produce
//! zeroed results instead of errors so dashboards render for new users.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::Receipt;
use crate::time_utils::{days_in_month, first_day_of_month, month_key, month_label, months_back};

/// All-time spend summary.
#[derive(Debug, Clone, Serialize)]
pub struct TotalSpend {
    pub total_spent: f64,
    pub receipt_count: u64,
}

/// Spend within one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSpend {
    /// "YYYY-MM"
    pub month: String,
    pub total_spent: f64,
    pub receipt_count: u64,
}

/// Average of per-month totals over the trailing six months.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAverage {
    pub monthly_average: f64,
    /// Months that actually had receipts (the average's denominator).
    pub months_counted: u64,
}

/// Current month against the previous calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthComparison {
    pub current_month: f64,
    pub previous_month: f64,
    pub difference: f64,
    /// Percent change rounded to 2 decimals; 0 when the previous month had
    /// no spend.
    pub percent_change: f64,
}

/// One month in the per-month breakdown series.
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    /// "YYYY-MM", the sort key.
    pub month: String,
    /// Human label, e.g. "March 2025".
    pub label: String,
    pub total_spent: f64,
    pub receipt_count: u64,
}

/// Per-receipt cost statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptAverages {
    pub average_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
}

/// Linear end-of-month spend projection.
#[derive(Debug, Clone, Serialize)]
pub struct MonthEndProjection {
    pub current_spend: f64,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub projected_total: f64,
}

/// Sum of cost and count over all receipts. Empty history yields {0, 0}.
pub fn total_spend(receipts: &[Receipt]) -> TotalSpend {
    TotalSpend {
        total_spent: receipts.iter().map(|r| r.cost).sum(),
        receipt_count: receipts.len() as u64,
    }
}

/// Spend within the calendar month of `today`.
pub fn current_month_spend(receipts: &[Receipt], today: NaiveDate) -> MonthSpend {
    let in_month = receipts
        .iter()
        .filter(|r| r.date.year() == today.year() && r.date.month() == today.month());

    let mut total = 0.0;
    let mut count = 0u64;
    for r in in_month {
        total += r.cost;
        count += 1;
    }

    MonthSpend {
        month: month_key(today),
        total_spent: total,
        receipt_count: count,
    }
}

/// Average of per-month totals over the trailing six months.
///
/// Months without receipts are absent from the grouping, so they do not
/// drag the average toward zero for sparse histories.
pub fn trailing_monthly_average(receipts: &[Receipt], today: NaiveDate) -> MonthlyAverage {
    let window_start = months_back(today, 6);
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();

    for r in receipts.iter().filter(|r| r.date >= window_start) {
        *by_month.entry(month_key(r.date)).or_insert(0.0) += r.cost;
    }

    let months = by_month.len() as u64;
    let average = if months > 0 {
        by_month.values().sum::<f64>() / months as f64
    } else {
        0.0
    };

    MonthlyAverage {
        monthly_average: average,
        months_counted: months,
    }
}

/// Spend over the trailing twelve months (date >= today - 12 months).
pub fn trailing_year_spend(receipts: &[Receipt], today: NaiveDate) -> TotalSpend {
    let window_start = months_back(today, 12);
    let in_window: Vec<&Receipt> = receipts.iter().filter(|r| r.date >= window_start).collect();

    TotalSpend {
        total_spent: in_window.iter().map(|r| r.cost).sum(),
        receipt_count: in_window.len() as u64,
    }
}

/// Current calendar month against the previous one.
pub fn month_comparison(receipts: &[Receipt], today: NaiveDate) -> MonthComparison {
    let current_start = first_day_of_month(today);
    let previous_start = months_back(current_start, 1);

    let mut current = 0.0;
    let mut previous = 0.0;
    for r in receipts {
        if r.date.year() == today.year() && r.date.month() == today.month() {
            current += r.cost;
        } else if r.date >= previous_start && r.date < current_start {
            previous += r.cost;
        }
    }

    let difference = current - previous;
    let percent_change = if previous > 0.0 {
        round2(difference / previous * 100.0)
    } else {
        0.0
    };

    MonthComparison {
        current_month: current,
        previous_month: previous,
        difference,
        percent_change,
    }
}

/// Per-month totals for the trailing six months, ascending by month key.
///
/// Only months with at least one receipt appear; the series is meant for
/// charting and the frontend fills gaps itself.
pub fn monthly_breakdown(receipts: &[Receipt], today: NaiveDate) -> Vec<MonthBucket> {
    let window_start = months_back(today, 6);
    let mut by_month: BTreeMap<String, MonthBucket> = BTreeMap::new();

    for r in receipts.iter().filter(|r| r.date >= window_start) {
        let key = month_key(r.date);
        let bucket = by_month.entry(key.clone()).or_insert_with(|| MonthBucket {
            month: key,
            label: month_label(r.date),
            total_spent: 0.0,
            receipt_count: 0,
        });
        bucket.total_spent += r.cost;
        bucket.receipt_count += 1;
    }

    by_month.into_values().collect()
}

/// Average, minimum and maximum cost per receipt; all zero when empty.
pub fn receipt_averages(receipts: &[Receipt]) -> ReceiptAverages {
    if receipts.is_empty() {
        return ReceiptAverages {
            average_cost: 0.0,
            min_cost: 0.0,
            max_cost: 0.0,
        };
    }

    let total: f64 = receipts.iter().map(|r| r.cost).sum();
    let min = receipts.iter().map(|r| r.cost).fold(f64::INFINITY, f64::min);
    let max = receipts
        .iter()
        .map(|r| r.cost)
        .fold(f64::NEG_INFINITY, f64::max);

    ReceiptAverages {
        average_cost: total / receipts.len() as f64,
        min_cost: min,
        max_cost: max,
    }
}

/// Linear projection of this month's spend to the end of the month.
///
/// `today` always has at least one elapsed day, so the division is safe.
pub fn month_end_projection(receipts: &[Receipt], today: NaiveDate) -> MonthEndProjection {
    let current = current_month_spend(receipts, today);
    let days_elapsed = today.day();
    let days_total = days_in_month(today);

    MonthEndProjection {
        current_spend: current.total_spent,
        days_elapsed,
        days_in_month: days_total,
        projected_total: current.total_spent * days_total as f64 / days_elapsed as f64,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn receipt(cost: f64, date: &str) -> Receipt {
        Receipt {
            id: 0,
            user_id: 1,
            vehicle_id: None,
            title: "Repostaje".to_string(),
            cost,
            date: date.parse().unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            description: String::new(),
            image_path: None,
            liters: None,
            odometer: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn test_total_spend_sums_costs() {
        let receipts = vec![
            receipt(40.0, "2025-03-01"),
            receipt(55.5, "2025-02-10"),
            receipt(12.5, "2024-07-01"),
        ];
        let total = total_spend(&receipts);
        assert_eq!(total.total_spent, 108.0);
        assert_eq!(total.receipt_count, 3);
    }

    #[test]
    fn test_total_spend_empty_is_zero() {
        let total = total_spend(&[]);
        assert_eq!(total.total_spent, 0.0);
        assert_eq!(total.receipt_count, 0);
    }

    #[test]
    fn test_current_month_filters_by_year_and_month() {
        let receipts = vec![
            receipt(40.0, "2025-03-01"),
            receipt(30.0, "2025-03-20"),
            receipt(99.0, "2024-03-15"), // same month, previous year
            receipt(55.5, "2025-02-10"),
        ];
        let month = current_month_spend(&receipts, today());
        assert_eq!(month.month, "2025-03");
        assert_eq!(month.total_spent, 70.0);
        assert_eq!(month.receipt_count, 2);
    }

    #[test]
    fn test_monthly_average_skips_empty_months() {
        // Two active months in the window; empty months must not count in
        // the denominator.
        let receipts = vec![
            receipt(100.0, "2025-03-01"),
            receipt(50.0, "2025-01-10"),
            receipt(50.0, "2025-01-20"),
        ];
        let avg = trailing_monthly_average(&receipts, today());
        assert_eq!(avg.months_counted, 2);
        assert_eq!(avg.monthly_average, 100.0);
    }

    #[test]
    fn test_monthly_average_empty_history() {
        let avg = trailing_monthly_average(&[], today());
        assert_eq!(avg.monthly_average, 0.0);
        assert_eq!(avg.months_counted, 0);
    }

    #[test]
    fn test_trailing_year_excludes_older_receipts() {
        let receipts = vec![
            receipt(40.0, "2025-03-01"),
            receipt(60.0, "2024-04-01"),
            receipt(999.0, "2024-03-15"), // exactly on the window start, stays (>=)
            receipt(10.0, "2023-12-31"),
        ];
        let year = trailing_year_spend(&receipts, today());
        assert_eq!(year.receipt_count, 3);
        assert_eq!(year.total_spent, 1099.0);
    }

    #[test]
    fn test_month_comparison_percentage() {
        let receipts = vec![
            receipt(120.0, "2025-03-05"),
            receipt(100.0, "2025-02-12"),
        ];
        let cmp = month_comparison(&receipts, today());
        assert_eq!(cmp.current_month, 120.0);
        assert_eq!(cmp.previous_month, 100.0);
        assert_eq!(cmp.difference, 20.0);
        assert_eq!(cmp.percent_change, 20.0);
    }

    #[test]
    fn test_month_comparison_zero_previous_month() {
        // No receipts last month: percent change must be 0, not a division
        // by zero, whatever the current spend.
        let receipts = vec![receipt(120.0, "2025-03-05")];
        let cmp = month_comparison(&receipts, today());
        assert_eq!(cmp.previous_month, 0.0);
        assert_eq!(cmp.percent_change, 0.0);
    }

    #[test]
    fn test_breakdown_sorted_ascending_and_complete() {
        let receipts = vec![
            receipt(10.0, "2025-03-02"),
            receipt(20.0, "2025-01-15"),
            receipt(30.0, "2025-03-20"),
            receipt(5.0, "2024-11-01"),
            receipt(99.0, "2024-06-01"), // outside the 6-month window
        ];
        let buckets = monthly_breakdown(&receipts, today());

        let keys: Vec<&str> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(keys, vec!["2024-11", "2025-01", "2025-03"]);

        assert_eq!(buckets[2].total_spent, 40.0);
        assert_eq!(buckets[2].receipt_count, 2);
        assert_eq!(buckets[2].label, "March 2025");
    }

    #[test]
    fn test_breakdown_serializes_as_bare_array() {
        // The per-month endpoint ships this series as-is: a JSON array,
        // no wrapping object.
        let receipts = vec![receipt(10.0, "2025-03-02")];
        let json = serde_json::to_value(monthly_breakdown(&receipts, today())).unwrap();

        let buckets = json.as_array().expect("breakdown must be a JSON array");
        assert_eq!(buckets[0]["month"], "2025-03");
        assert_eq!(buckets[0]["total_spent"], 10.0);
    }

    #[test]
    fn test_receipt_averages() {
        let receipts = vec![
            receipt(10.0, "2025-03-01"),
            receipt(50.0, "2025-02-01"),
            receipt(30.0, "2025-01-01"),
        ];
        let stats = receipt_averages(&receipts);
        assert_eq!(stats.average_cost, 30.0);
        assert_eq!(stats.min_cost, 10.0);
        assert_eq!(stats.max_cost, 50.0);
    }

    #[test]
    fn test_receipt_averages_empty() {
        let stats = receipt_averages(&[]);
        assert_eq!(stats.average_cost, 0.0);
        assert_eq!(stats.min_cost, 0.0);
        assert_eq!(stats.max_cost, 0.0);
    }

    #[test]
    fn test_month_end_projection_linear() {
        // 100 spent by March 15 -> 31/15 of it projected for the month.
        let receipts = vec![receipt(100.0, "2025-03-10")];
        let projection = month_end_projection(&receipts, today());
        assert_eq!(projection.current_spend, 100.0);
        assert_eq!(projection.days_elapsed, 15);
        assert_eq!(projection.days_in_month, 31);
        assert!((projection.projected_total - 100.0 * 31.0 / 15.0).abs() < 1e-9);
    }
}
