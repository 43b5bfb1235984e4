// SPDX-License-Identifier: MIT

//! Real-world consumption and cost-per-km from paired fill-ups.
//!
//! Each fill-up (a receipt with liters and odometer) is paired with the most
//! recent earlier receipt of the same vehicle that has an odometer reading.
//! The distance between the two readings turns liters and cost into
//! per-distance figures. Inconsistent data (negative or zero distance) is
//! passed through unclamped: the averaging step filters it, the returned
//! history never does.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::models::Receipt;

/// Consumption values at or above this are treated as data errors when
/// averaging (l/100km).
const MAX_PLAUSIBLE_CONSUMPTION: f64 = 50.0;

/// Cost-per-km values at or above this are treated as data errors when
/// averaging (currency/km).
const MAX_PLAUSIBLE_COST_PER_KM: f64 = 1.0;

/// One fill-up with its derived per-distance metrics.
///
/// The metric fields are `None` when the fill-up has no earlier odometer
/// reading to pair with. Division by a zero distance yields non-finite
/// values, which serde_json renders as null but which stay in the series
/// for caller-side inspection.
#[derive(Debug, Clone, Serialize)]
pub struct FillUpEntry {
    pub receipt_id: i64,
    pub vehicle_id: Option<i64>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub cost: f64,
    pub liters: f64,
    pub odometer: f64,
    /// Odometer delta to the previous fill-up; may be <= 0 on bad data.
    pub distance_km: Option<f64>,
    pub consumption_l_100km: Option<f64>,
    pub cost_per_km: Option<f64>,
}

/// `{average, history}` payload for the consumption and cost endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionReport {
    pub average: f64,
    pub history: Vec<FillUpEntry>,
}

/// Build the fill-up history for a user, ascending by (date, time).
///
/// The lookback is a single chronological sweep keeping, per vehicle, the
/// last receipt seen with an odometer reading.
pub fn fill_up_history(receipts: &[Receipt]) -> Vec<FillUpEntry> {
    let mut ordered: Vec<&Receipt> = receipts.iter().collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.time.cmp(&b.time))
            .then(a.id.cmp(&b.id))
    });

    // vehicle_id -> odometer of the latest earlier receipt with a reading
    let mut last_odometer: HashMap<i64, f64> = HashMap::new();
    let mut history = Vec::new();

    for receipt in ordered {
        if let (Some(liters), Some(odometer)) = (receipt.liters, receipt.odometer) {
            let previous = receipt
                .vehicle_id
                .and_then(|v| last_odometer.get(&v).copied());

            let distance = previous.map(|prev| odometer - prev);
            history.push(FillUpEntry {
                receipt_id: receipt.id,
                vehicle_id: receipt.vehicle_id,
                date: receipt.date,
                time: receipt.time,
                cost: receipt.cost,
                liters,
                odometer,
                distance_km: distance,
                consumption_l_100km: distance.map(|d| liters / d * 100.0),
                cost_per_km: distance.map(|d| receipt.cost / d),
            });
        }

        if let (Some(vehicle_id), Some(odometer)) = (receipt.vehicle_id, receipt.odometer) {
            last_odometer.insert(vehicle_id, odometer);
        }
    }

    history
}

/// Average real consumption (l/100km, 2 decimals) plus the full history.
pub fn consumption_report(receipts: &[Receipt]) -> ConsumptionReport {
    let history = fill_up_history(receipts);
    let average = filtered_mean(
        history.iter().filter_map(|e| e.consumption_l_100km),
        MAX_PLAUSIBLE_CONSUMPTION,
    );

    ConsumptionReport {
        average: round_dp(average, 2),
        history,
    }
}

/// Average cost per km (4 decimals) plus the full history.
pub fn cost_per_km_report(receipts: &[Receipt]) -> ConsumptionReport {
    let history = fill_up_history(receipts);
    let average = filtered_mean(
        history.iter().filter_map(|e| e.cost_per_km),
        MAX_PLAUSIBLE_COST_PER_KM,
    );

    ConsumptionReport {
        average: round_dp(average, 4),
        history,
    }
}

/// Mean of values in the open interval (0, max); 0 when nothing survives
/// the filter. Non-finite values fail the comparisons and drop out.
fn filtered_mean(values: impl Iterator<Item = f64>, max: f64) -> f64 {
    let kept: Vec<f64> = values.filter(|v| *v > 0.0 && *v < max).collect();
    if kept.is_empty() {
        return 0.0;
    }
    kept.iter().sum::<f64>() / kept.len() as f64
}

fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(
        id: i64,
        vehicle: Option<i64>,
        date: &str,
        liters: Option<f64>,
        odometer: Option<f64>,
        cost: f64,
    ) -> Receipt {
        Receipt {
            id,
            user_id: 1,
            vehicle_id: vehicle,
            title: "Repostaje".to_string(),
            cost,
            date: date.parse().unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            description: String::new(),
            image_path: None,
            liters,
            odometer,
        }
    }

    #[test]
    fn test_pairs_with_immediately_preceding_fill_up() {
        let receipts = vec![
            fill(1, Some(7), "2025-01-01", None, Some(10_000.0), 50.0),
            fill(2, Some(7), "2025-01-15", Some(40.0), Some(10_500.0), 60.0),
            fill(3, Some(7), "2025-02-01", Some(35.0), Some(11_200.0), 55.0),
        ];
        let history = fill_up_history(&receipts);

        // Receipt 1 has no liters: it seeds the lookback but is not a
        // fill-up entry itself.
        assert_eq!(history.len(), 2);

        assert_eq!(history[0].receipt_id, 2);
        assert_eq!(history[0].distance_km, Some(500.0));
        assert_eq!(history[0].consumption_l_100km, Some(8.0));
        assert_eq!(history[0].cost_per_km, Some(0.12));

        assert_eq!(history[1].receipt_id, 3);
        assert_eq!(history[1].distance_km, Some(700.0));
        assert_eq!(history[1].consumption_l_100km, Some(5.0));
    }

    #[test]
    fn test_first_fill_up_has_null_metrics() {
        let receipts = vec![fill(1, Some(7), "2025-01-01", Some(40.0), Some(10_000.0), 50.0)];
        let history = fill_up_history(&receipts);

        assert_eq!(history.len(), 1);
        assert!(history[0].distance_km.is_none());
        assert!(history[0].consumption_l_100km.is_none());
        assert!(history[0].cost_per_km.is_none());
    }

    #[test]
    fn test_vehicles_do_not_cross_pair() {
        let receipts = vec![
            fill(1, Some(1), "2025-01-01", Some(40.0), Some(10_000.0), 50.0),
            fill(2, Some(2), "2025-01-10", Some(30.0), Some(50_000.0), 45.0),
            fill(3, Some(1), "2025-01-20", Some(40.0), Some(10_600.0), 52.0),
        ];
        let history = fill_up_history(&receipts);

        // Vehicle 2's only fill-up must not pair against vehicle 1.
        assert!(history[1].distance_km.is_none());
        assert_eq!(history[2].distance_km, Some(600.0));
    }

    #[test]
    fn test_receipt_without_vehicle_never_pairs() {
        let receipts = vec![
            fill(1, None, "2025-01-01", Some(40.0), Some(10_000.0), 50.0),
            fill(2, None, "2025-01-15", Some(40.0), Some(10_500.0), 50.0),
        ];
        let history = fill_up_history(&receipts);

        assert_eq!(history.len(), 2);
        assert!(history[0].distance_km.is_none());
        assert!(history[1].distance_km.is_none());
    }

    #[test]
    fn test_zero_distance_yields_non_finite_kept_in_history() {
        // Same-day duplicate odometer entries: distance 0, division blows
        // up, and the raw values must survive in the history.
        let mut second = fill(2, Some(7), "2025-01-01", Some(40.0), Some(10_000.0), 50.0);
        second.time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let receipts = vec![
            fill(1, Some(7), "2025-01-01", Some(40.0), Some(10_000.0), 50.0),
            second,
        ];

        let report = consumption_report(&receipts);
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.history[1].distance_km, Some(0.0));
        assert!(report.history[1].consumption_l_100km.unwrap().is_infinite());
        // ...but the average ignores it.
        assert_eq!(report.average, 0.0);
    }

    #[test]
    fn test_negative_distance_passed_through_unclamped() {
        let receipts = vec![
            fill(1, Some(7), "2025-01-01", Some(40.0), Some(10_500.0), 50.0),
            fill(2, Some(7), "2025-01-15", Some(40.0), Some(10_000.0), 50.0),
        ];
        let report = consumption_report(&receipts);

        assert_eq!(report.history[1].distance_km, Some(-500.0));
        assert!(report.history[1].consumption_l_100km.unwrap() < 0.0);
        assert_eq!(report.average, 0.0);
    }

    #[test]
    fn test_outlier_excluded_from_average_but_present_in_history() {
        let receipts = vec![
            fill(1, Some(7), "2025-01-01", None, Some(10_000.0), 0.0),
            // 55 l over 100 km -> 55 l/100km, above the plausibility cap.
            fill(2, Some(7), "2025-01-10", Some(55.0), Some(10_100.0), 80.0),
            // 40 l over 500 km -> 8 l/100km.
            fill(3, Some(7), "2025-01-20", Some(40.0), Some(10_600.0), 60.0),
        ];
        let report = consumption_report(&receipts);

        let outlier = report.history[0].consumption_l_100km.unwrap();
        assert!((outlier - 55.0).abs() < 1e-9);
        assert_eq!(report.average, 8.0);
    }

    #[test]
    fn test_cost_per_km_rounded_to_four_decimals() {
        let receipts = vec![
            fill(1, Some(7), "2025-01-01", None, Some(10_000.0), 0.0),
            fill(2, Some(7), "2025-01-10", Some(40.0), Some(10_700.0), 61.3),
        ];
        let report = cost_per_km_report(&receipts);

        // 61.3 / 700 = 0.08757...
        assert_eq!(report.average, 0.0876);
    }

    #[test]
    fn test_empty_history_averages_zero() {
        let report = consumption_report(&[]);
        assert_eq!(report.average, 0.0);
        assert!(report.history.is_empty());
    }
}
