// SPDX-License-Identifier: MIT

//! Vehicle model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default oil-change interval when the owner does not supply one.
pub const DEFAULT_OIL_INTERVAL_KM: f64 = 15_000.0;
pub const DEFAULT_OIL_INTERVAL_MONTHS: i32 = 12;

/// A registered vehicle. Unique per (owner, make, model).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub fuel_type: String,
    /// Odometer reading when the vehicle was registered (km).
    pub initial_odometer: Option<f64>,
    /// Tank capacity in liters.
    pub tank_capacity: Option<f64>,
    /// Manufacturer consumption figure (l/100km), for comparison against
    /// the measured one.
    pub theoretical_consumption: Option<f64>,
    pub last_oil_change_date: Option<NaiveDate>,
    pub last_oil_change_odometer: Option<f64>,
    pub oil_change_interval_km: f64,
    pub oil_change_interval_months: i32,
}
