// SPDX-License-Identifier: MIT

//! Gas station model (mirror of the ministry dataset).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A gas station record, shared reference data with no owner.
///
/// Price fields keep the dataset's fuel names; 0 means "not sold / not
/// reported". Coordinates (0, 0) mean the location is unknown and the
/// station is excluded from proximity queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Station {
    /// Ministry-assigned identifier (IDEESS), globally unique.
    pub station_id: String,
    pub name: String,
    pub address: String,
    pub municipality: String,
    pub province: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Opening hours; "24H" is the canonical round-the-clock marker.
    pub schedule: String,
    pub gasolina_95: f64,
    pub gasolina_95_e10: f64,
    pub gasolina_98: f64,
    pub gasoleo_a: f64,
    pub gasoleo_premium: f64,
    pub glp: f64,
    pub biodiesel: f64,
    pub bioetanol: f64,
    pub ester_metilico: f64,
    pub hidrogeno: f64,
    pub updated_at: DateTime<Utc>,
}
