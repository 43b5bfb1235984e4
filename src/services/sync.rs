// SPDX-License-Identifier: MIT

//! Station dataset synchronization.
//!
//! Workflow:
//! 1. Fetch the snapshot from the feed (or take inline records)
//! 2. Normalize the source fields into fixed internal records
//! 3. Reconcile against storage in a single transaction
//! 4. Write the sync-run audit row
//!
//! A record-level failure is counted and skipped; a failure outside the
//! per-record savepoints rolls back the whole batch and no audit row is
//! written.

use std::time::Instant;

use serde::Serialize;

use crate::db::Db;
use crate::error::AppError;
use crate::models::SyncStatus;
use crate::services::fuel_feed::{FuelFeedClient, RawStationRecord};

/// A station record after ingestion-boundary normalization.
///
/// Downstream reconciliation only ever sees this shape, never the feed's
/// field names or comma-decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStation {
    pub station_id: String,
    pub name: String,
    pub address: String,
    pub municipality: String,
    pub province: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
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
}

/// Result of one synchronization pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub total: i32,
    pub inserted: i32,
    pub updated: i32,
    pub errors: i32,
    pub duration_seconds: f64,
    pub status: SyncStatus,
}

/// Runs the reconciliation batch against storage.
#[derive(Clone)]
pub struct StationSyncService {
    db: Db,
    feed: FuelFeedClient,
}

impl StationSyncService {
    pub fn new(db: Db, feed: FuelFeedClient) -> Self {
        Self { db, feed }
    }

    /// Fetch the snapshot from the feed and reconcile it.
    pub async fn run(&self) -> Result<SyncOutcome, AppError> {
        let records = self.feed.fetch_snapshot().await?;
        self.run_with_records(records).await
    }

    /// Reconcile an already-fetched batch of raw records.
    pub async fn run_with_records(
        &self,
        records: Vec<RawStationRecord>,
    ) -> Result<SyncOutcome, AppError> {
        let start = Instant::now();
        let stations = normalize_records(&records);
        tracing::info!(
            received = records.len(),
            usable = stations.len(),
            "Reconciling station snapshot"
        );

        let counts = self.db.reconcile_stations(&stations).await?;

        let outcome = SyncOutcome {
            total: stations.len() as i32,
            inserted: counts.inserted,
            updated: counts.updated,
            errors: counts.errors,
            duration_seconds: start.elapsed().as_secs_f64(),
            status: if counts.errors == 0 {
                SyncStatus::Success
            } else {
                SyncStatus::Partial
            },
        };

        // The audit row is only written for a committed batch; if the
        // reconciliation rolled back we never get here.
        self.db.insert_sync_run(&outcome).await?;

        tracing::info!(
            total = outcome.total,
            inserted = outcome.inserted,
            updated = outcome.updated,
            errors = outcome.errors,
            duration_seconds = outcome.duration_seconds,
            status = outcome.status.as_str(),
            "Station sync finished"
        );
        Ok(outcome)
    }
}

/// Map raw feed records into normalized ones, dropping unusable entries.
///
/// A record is unusable when it has no identifier or when either
/// coordinate is the 0 "unknown location" sentinel.
pub fn normalize_records(records: &[RawStationRecord]) -> Vec<NormalizedStation> {
    records
        .iter()
        .map(normalize_record)
        .filter(|s| !s.station_id.is_empty() && s.latitude != 0.0 && s.longitude != 0.0)
        .collect()
}

fn normalize_record(record: &RawStationRecord) -> NormalizedStation {
    let name = if record.name.trim().is_empty() {
        "Sin Nombre".to_string()
    } else {
        record.name.trim().to_string()
    };

    NormalizedStation {
        station_id: record.id.trim().to_string(),
        name,
        address: record.address.trim().to_string(),
        municipality: record.municipality.trim().to_string(),
        province: record.province.trim().to_string(),
        postal_code: extract_postal_code(&record.address, &record.municipality),
        latitude: parse_decimal(&record.latitude),
        longitude: parse_decimal(&record.longitude),
        schedule: normalize_schedule(&record.schedule),
        gasolina_95: parse_decimal(&record.gasolina_95),
        gasolina_95_e10: parse_decimal(&record.gasolina_95_e10),
        gasolina_98: parse_decimal(&record.gasolina_98),
        gasoleo_a: parse_decimal(&record.gasoleo_a),
        gasoleo_premium: parse_decimal(&record.gasoleo_premium),
        glp: parse_decimal(&record.glp),
        biodiesel: parse_decimal(&record.biodiesel),
        bioetanol: parse_decimal(&record.bioetanol),
        ester_metilico: parse_decimal(&record.ester_metilico),
        hidrogeno: parse_decimal(&record.hidrogeno),
    }
}

/// Parse a comma-decimal numeric string; empty, "N/A" and garbage become 0.
pub fn parse_decimal(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("N/A") {
        return 0.0;
    }
    trimmed.replace(',', ".").parse().unwrap_or(0.0)
}

/// Canonicalize the opening-hours descriptor.
///
/// The source marks round-the-clock stations either with a "24H" substring
/// or with a literal "1".
pub fn normalize_schedule(raw: &str) -> String {
    let schedule = raw.trim();
    if schedule.to_uppercase().contains("24H") || schedule == "1" {
        "24H".to_string()
    } else {
        schedule.to_string()
    }
}

/// Extract a five-digit postal code from the address, falling back to the
/// municipality text; empty when neither contains one.
pub fn extract_postal_code(address: &str, municipality: &str) -> String {
    find_five_digit_run(address)
        .or_else(|| find_five_digit_run(municipality))
        .unwrap_or_default()
}

/// First standalone run of exactly five ASCII digits in the text.
fn find_five_digit_run(text: &str) -> Option<String> {
    let mut run_start = None;
    let chars: Vec<char> = text.chars().collect();

    for i in 0..=chars.len() {
        let is_digit = i < chars.len() && chars[i].is_ascii_digit();
        match (run_start, is_digit) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                if i - start == 5 {
                    return Some(chars[start..i].iter().collect());
                }
                run_start = None;
            }
            _ => {}
        }
    }
    None
}
