// SPDX-License-Identifier: MIT

//! Fuel purchase receipt model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A logged fuel purchase.
///
/// `(date, time)` gives the total order used by listings and by the
/// previous-fill-up lookback. `liters` and `odometer` are only present for
/// receipts logged as fill-ups; a receipt with both is a data point for the
/// consumption reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub user_id: i64,
    pub vehicle_id: Option<i64>,
    pub title: String,
    /// Currency amount, non-negative.
    pub cost: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
    /// Opaque reference to an uploaded receipt image, if any. Blob handling
    /// lives elsewhere.
    pub image_path: Option<String>,
    pub liters: Option<f64>,
    /// Odometer reading at purchase time (km).
    pub odometer: Option<f64>,
}
