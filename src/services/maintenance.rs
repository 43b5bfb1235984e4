// SPDX-License-Identifier: MIT

//! Oil-change due status per vehicle.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Receipt, Vehicle};

/// A vehicle is flagged as due within this many km of the interval.
const DUE_DISTANCE_MARGIN_KM: f64 = 500.0;

/// A vehicle is flagged as due within this many months of the interval.
const DUE_MONTHS_MARGIN: i64 = 1;

/// Oil-change status for one vehicle.
///
/// Distance fields are `None` when the vehicle has no receipt with an
/// odometer reading yet; the calendar-based fields still apply.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceStatus {
    pub vehicle_id: i64,
    pub make: String,
    pub model: String,
    pub latest_odometer: Option<f64>,
    pub distance_since_change_km: Option<f64>,
    pub distance_remaining_km: Option<f64>,
    pub months_since_change: i64,
    pub months_remaining: i64,
    pub due: bool,
    /// Distance progress through the interval, one decimal place.
    pub progress_percent: Option<f64>,
}

/// Compute the oil-change status for every vehicle of a user.
///
/// `receipts` is the user's full receipt history; the latest odometer per
/// vehicle is resolved from it in one pass.
pub fn maintenance_statuses(
    vehicles: &[Vehicle],
    receipts: &[Receipt],
    today: NaiveDate,
) -> Vec<MaintenanceStatus> {
    let latest_odometers = latest_odometer_by_vehicle(receipts);

    vehicles
        .iter()
        .map(|v| vehicle_status(v, latest_odometers.get(&v.id).copied(), today))
        .collect()
}

/// Latest known odometer per vehicle: the reading of the newest receipt
/// (by date, then time) that has one.
fn latest_odometer_by_vehicle(receipts: &[Receipt]) -> HashMap<i64, f64> {
    let mut latest: HashMap<i64, (NaiveDate, chrono::NaiveTime, f64)> = HashMap::new();

    for r in receipts {
        let (Some(vehicle_id), Some(odometer)) = (r.vehicle_id, r.odometer) else {
            continue;
        };
        match latest.get(&vehicle_id) {
            Some((date, time, _)) if (*date, *time) >= (r.date, r.time) => {}
            _ => {
                latest.insert(vehicle_id, (r.date, r.time, odometer));
            }
        }
    }

    latest.into_iter().map(|(k, (_, _, odo))| (k, odo)).collect()
}

fn vehicle_status(
    vehicle: &Vehicle,
    latest_odometer: Option<f64>,
    today: NaiveDate,
) -> MaintenanceStatus {
    let baseline = vehicle.last_oil_change_odometer.unwrap_or(0.0);

    let distance_since = latest_odometer.map(|odo| odo - baseline);
    let distance_remaining = distance_since.map(|d| vehicle.oil_change_interval_km - d);

    let months_since = match vehicle.last_oil_change_date {
        Some(change_date) => today.signed_duration_since(change_date).num_days() / 30,
        None => 0,
    };
    let months_remaining = i64::from(vehicle.oil_change_interval_months) - months_since;

    let due_by_distance = distance_remaining.is_some_and(|d| d <= DUE_DISTANCE_MARGIN_KM);
    let due_by_calendar = months_remaining <= DUE_MONTHS_MARGIN;

    let progress = distance_since.map(|d| {
        let pct = d / vehicle.oil_change_interval_km * 100.0;
        (pct * 10.0).round() / 10.0
    });

    MaintenanceStatus {
        vehicle_id: vehicle.id,
        make: vehicle.make.clone(),
        model: vehicle.model.clone(),
        latest_odometer,
        distance_since_change_km: distance_since,
        distance_remaining_km: distance_remaining,
        months_since_change: months_since,
        months_remaining,
        due: due_by_distance || due_by_calendar,
        progress_percent: progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn vehicle(id: i64, interval_km: f64, interval_months: i32) -> Vehicle {
        Vehicle {
            id,
            user_id: 1,
            make: "Seat".to_string(),
            model: "Ibiza".to_string(),
            fuel_type: "gasolina".to_string(),
            initial_odometer: None,
            tank_capacity: None,
            theoretical_consumption: None,
            last_oil_change_date: None,
            last_oil_change_odometer: None,
            oil_change_interval_km: interval_km,
            oil_change_interval_months: interval_months,
        }
    }

    fn odometer_receipt(vehicle_id: i64, date: &str, odometer: f64) -> Receipt {
        Receipt {
            id: 0,
            user_id: 1,
            vehicle_id: Some(vehicle_id),
            title: "Repostaje".to_string(),
            cost: 50.0,
            date: date.parse().unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            description: String::new(),
            image_path: None,
            liters: Some(40.0),
            odometer: Some(odometer),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_due_when_within_distance_margin() {
        let mut v = vehicle(1, 15_000.0, 12);
        v.last_oil_change_odometer = Some(20_000.0);
        let receipts = vec![odometer_receipt(1, "2025-05-20", 34_600.0)];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        let status = &statuses[0];

        assert_eq!(status.distance_since_change_km, Some(14_600.0));
        assert_eq!(status.distance_remaining_km, Some(400.0));
        assert!(status.due);
        assert_eq!(status.progress_percent, Some(97.3));
    }

    #[test]
    fn test_not_due_with_plenty_of_margin() {
        let mut v = vehicle(1, 15_000.0, 12);
        v.last_oil_change_odometer = Some(20_000.0);
        v.last_oil_change_date = Some("2025-03-01".parse().unwrap());
        let receipts = vec![odometer_receipt(1, "2025-05-20", 25_000.0)];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        let status = &statuses[0];

        assert_eq!(status.distance_remaining_km, Some(10_000.0));
        assert_eq!(status.months_since_change, 3);
        assert_eq!(status.months_remaining, 9);
        assert!(!status.due);
    }

    #[test]
    fn test_due_by_calendar_alone() {
        let mut v = vehicle(1, 15_000.0, 12);
        v.last_oil_change_odometer = Some(20_000.0);
        // 11.5 months ago -> floor(days/30) = 11 -> 1 month remaining.
        v.last_oil_change_date = Some("2024-06-20".parse().unwrap());
        let receipts = vec![odometer_receipt(1, "2025-05-20", 21_000.0)];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        let status = &statuses[0];

        assert!(status.months_remaining <= 1);
        assert!(status.due);
    }

    #[test]
    fn test_vehicle_without_receipts_does_not_crash() {
        let v = vehicle(1, 15_000.0, 12);
        let statuses = maintenance_statuses(&[v], &[], today());
        let status = &statuses[0];

        assert!(status.latest_odometer.is_none());
        assert!(status.distance_since_change_km.is_none());
        assert!(status.progress_percent.is_none());
        assert_eq!(status.months_since_change, 0);
        assert!(!status.due);
    }

    #[test]
    fn test_unset_baseline_treated_as_zero() {
        let v = vehicle(1, 15_000.0, 12);
        let receipts = vec![odometer_receipt(1, "2025-05-20", 9_000.0)];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        let status = &statuses[0];

        assert_eq!(status.distance_since_change_km, Some(9_000.0));
        assert_eq!(status.distance_remaining_km, Some(6_000.0));
        assert_eq!(status.progress_percent, Some(60.0));
    }

    #[test]
    fn test_statuses_serialize_as_bare_array() {
        // The maintenance endpoint ships this as-is: a JSON array with one
        // status object per vehicle.
        let mut v = vehicle(1, 15_000.0, 12);
        v.last_oil_change_odometer = Some(20_000.0);
        let receipts = vec![odometer_receipt(1, "2025-05-20", 25_000.0)];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        let json = serde_json::to_value(&statuses).unwrap();

        let entries = json.as_array().expect("statuses must be a JSON array");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["vehicle_id"], 1);
        assert_eq!(entries[0]["due"], false);
    }

    #[test]
    fn test_latest_odometer_is_newest_reading() {
        let mut v = vehicle(1, 15_000.0, 12);
        v.last_oil_change_odometer = Some(0.0);
        let receipts = vec![
            odometer_receipt(1, "2025-05-20", 12_000.0),
            odometer_receipt(1, "2025-01-10", 9_000.0),
            odometer_receipt(1, "2025-03-15", 10_500.0),
        ];

        let statuses = maintenance_statuses(&[v], &receipts, today());
        assert_eq!(statuses[0].latest_odometer, Some(12_000.0));
    }
}
