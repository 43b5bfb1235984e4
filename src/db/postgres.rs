// SPDX-License-Identifier: MIT

//! Postgres gateway with typed operations.
//!
//! Provides high-level operations for:
//! - Users (identity resolution, profile, soft delete)
//! - Vehicles (registration, listing, deletion)
//! - Receipts (logging, listing, deletion)
//! - Stations (listing, batch reconciliation)
//! - Sync runs (audit log)
//!
//! Every method uses parameterized queries; connections are pooled and
//! released when the acquired handle goes out of scope on any exit path.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Acquire, PgPool, Postgres, Transaction};

use crate::error::AppError;
use crate::models::{Receipt, Station, SyncRun, User, Vehicle};
use crate::services::sync::{NormalizedStation, SyncOutcome};

/// Postgres database client.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

/// Counters from one station reconciliation batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationSyncCounts {
    pub inserted: i32,
    pub updated: i32,
    pub errors: i32,
}

impl Db {
    /// Connect to Postgres and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!("Connected to Postgres");
        Ok(Self { pool })
    }

    /// Create a client with a lazy pool that never connects.
    ///
    /// For offline route tests: any operation fails with a database error
    /// instead of hanging.
    pub fn new_lazy(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_millis(100))
            .connect_lazy(database_url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?;
        Ok(Self { pool })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Resolve an authenticated email to the stored user id.
    ///
    /// Fails with NotFound when the identity does not resolve; for an
    /// authenticated caller that signals an inconsistency, not user error.
    pub async fn user_id_by_email(&self, email: &str) -> Result<i64, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id,)| id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }

    /// Get a user's profile by email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, active, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Soft-delete a user: flip `active` to false, keep the row.
    ///
    /// Vehicles and receipts are deliberately left in place.
    /// Returns the number of rows affected (0 means unknown email).
    pub async fn deactivate_user(&self, email: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE users SET active = FALSE WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ─── Vehicle Operations ──────────────────────────────────────

    pub async fn vehicles_for_user(&self, user_id: i64) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, make, model, fuel_type, initial_odometer, tank_capacity, \
             theoretical_consumption, last_oil_change_date, last_oil_change_odometer, \
             oil_change_interval_km, oil_change_interval_months \
             FROM vehicles WHERE user_id = $1 ORDER BY make, model",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    /// Whether the user already registered this make/model.
    pub async fn vehicle_exists(
        &self,
        user_id: i64,
        make: &str,
        model: &str,
    ) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM vehicles WHERE user_id = $1 AND make = $2 AND model = $3",
        )
        .bind(user_id)
        .bind(make)
        .bind(model)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_vehicle(
        &self,
        user_id: i64,
        make: &str,
        model: &str,
        fuel_type: &str,
        initial_odometer: Option<f64>,
        tank_capacity: Option<f64>,
        theoretical_consumption: Option<f64>,
        last_oil_change_date: Option<chrono::NaiveDate>,
        last_oil_change_odometer: Option<f64>,
        oil_change_interval_km: f64,
        oil_change_interval_months: i32,
    ) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO vehicles (user_id, make, model, fuel_type, initial_odometer, \
             tank_capacity, theoretical_consumption, last_oil_change_date, \
             last_oil_change_odometer, oil_change_interval_km, oil_change_interval_months) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
        )
        .bind(user_id)
        .bind(make)
        .bind(model)
        .bind(fuel_type)
        .bind(initial_odometer)
        .bind(tank_capacity)
        .bind(theoretical_consumption)
        .bind(last_oil_change_date)
        .bind(last_oil_change_odometer)
        .bind(oil_change_interval_km)
        .bind(oil_change_interval_months)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Owner id of a vehicle, if it exists.
    pub async fn vehicle_owner(&self, vehicle_id: i64) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    pub async fn delete_vehicle(&self, vehicle_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Receipt Operations ──────────────────────────────────────

    /// All receipts for a user, newest first by (date, time).
    pub async fn receipts_for_user(&self, user_id: i64) -> Result<Vec<Receipt>, AppError> {
        let receipts = sqlx::query_as::<_, Receipt>(
            "SELECT id, user_id, vehicle_id, title, cost, date, time, description, \
             image_path, liters, odometer \
             FROM receipts WHERE user_id = $1 ORDER BY date DESC, time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(receipts)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_receipt(
        &self,
        user_id: i64,
        vehicle_id: Option<i64>,
        title: &str,
        cost: f64,
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        description: &str,
        image_path: Option<&str>,
        liters: Option<f64>,
        odometer: Option<f64>,
    ) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO receipts (user_id, vehicle_id, title, cost, date, time, \
             description, image_path, liters, odometer) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(title)
        .bind(cost)
        .bind(date)
        .bind(time)
        .bind(description)
        .bind(image_path)
        .bind(liters)
        .bind(odometer)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Owner id and image reference of a receipt, if it exists.
    pub async fn receipt_owner(
        &self,
        receipt_id: i64,
    ) -> Result<Option<(i64, Option<String>)>, AppError> {
        let row: Option<(i64, Option<String>)> =
            sqlx::query_as("SELECT user_id, image_path FROM receipts WHERE id = $1")
                .bind(receipt_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn delete_receipt(&self, receipt_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(receipt_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Station Operations ──────────────────────────────────────

    /// All stations with a known location, ordered by name.
    pub async fn stations_with_location(&self) -> Result<Vec<Station>, AppError> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT * FROM stations WHERE latitude <> 0 AND longitude <> 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stations)
    }

    /// Reconcile a normalized snapshot against the stations table.
    ///
    /// The whole batch runs in one transaction. Each record gets its own
    /// savepoint so a bad record is rolled back, counted, and skipped
    /// without poisoning the surrounding transaction; anything that fails
    /// outside a savepoint aborts and rolls back the entire batch.
    pub async fn reconcile_stations(
        &self,
        stations: &[NormalizedStation],
    ) -> Result<StationSyncCounts, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut counts = StationSyncCounts::default();

        for station in stations {
            let mut savepoint = tx.begin().await?;
            match upsert_station(&mut savepoint, station).await {
                Ok(inserted) => {
                    savepoint.commit().await?;
                    if inserted {
                        counts.inserted += 1;
                    } else {
                        counts.updated += 1;
                    }
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    counts.errors += 1;
                    tracing::warn!(
                        station_id = %station.station_id,
                        error = %err,
                        "Skipping station record"
                    );
                }
            }
        }

        tx.commit().await?;
        Ok(counts)
    }

    // ─── Sync Run Audit Log ──────────────────────────────────────

    /// Write the immutable audit row for a committed sync pass.
    pub async fn insert_sync_run(&self, outcome: &SyncOutcome) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sync_runs (total, inserted, updated, errors, duration_seconds, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(outcome.total)
        .bind(outcome.inserted)
        .bind(outcome.updated)
        .bind(outcome.errors)
        .bind(outcome.duration_seconds)
        .bind(outcome.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent sync runs, newest first.
    pub async fn recent_sync_runs(&self, limit: i64) -> Result<Vec<SyncRun>, AppError> {
        let runs = sqlx::query_as::<_, SyncRun>(
            "SELECT id, total, inserted, updated, errors, duration_seconds, status, created_at \
             FROM sync_runs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }
}

/// Insert or update one station inside the batch transaction.
///
/// Returns true when a new row was inserted. Concurrent syncs can both see
/// "absent" and race the insert; the primary key is the backstop and the
/// loser surfaces as a per-record error.
async fn upsert_station(
    tx: &mut Transaction<'_, Postgres>,
    station: &NormalizedStation,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT station_id FROM stations WHERE station_id = $1")
            .bind(&station.station_id)
            .fetch_optional(&mut **tx)
            .await?;

    if existing.is_none() {
        sqlx::query(
            "INSERT INTO stations (station_id, name, address, municipality, province, \
             postal_code, latitude, longitude, schedule, gasolina_95, gasolina_95_e10, \
             gasolina_98, gasoleo_a, gasoleo_premium, glp, biodiesel, bioetanol, \
             ester_metilico, hidrogeno) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
             $16, $17, $18, $19)",
        )
        .bind(&station.station_id)
        .bind(&station.name)
        .bind(&station.address)
        .bind(&station.municipality)
        .bind(&station.province)
        .bind(&station.postal_code)
        .bind(station.latitude)
        .bind(station.longitude)
        .bind(&station.schedule)
        .bind(station.gasolina_95)
        .bind(station.gasolina_95_e10)
        .bind(station.gasolina_98)
        .bind(station.gasoleo_a)
        .bind(station.gasoleo_premium)
        .bind(station.glp)
        .bind(station.biodiesel)
        .bind(station.bioetanol)
        .bind(station.ester_metilico)
        .bind(station.hidrogeno)
        .execute(&mut **tx)
        .await?;
        Ok(true)
    } else {
        sqlx::query(
            "UPDATE stations SET name = $2, address = $3, municipality = $4, province = $5, \
             postal_code = $6, latitude = $7, longitude = $8, schedule = $9, \
             gasolina_95 = $10, gasolina_95_e10 = $11, gasolina_98 = $12, gasoleo_a = $13, \
             gasoleo_premium = $14, glp = $15, biodiesel = $16, bioetanol = $17, \
             ester_metilico = $18, hidrogeno = $19, updated_at = now() \
             WHERE station_id = $1",
        )
        .bind(&station.station_id)
        .bind(&station.name)
        .bind(&station.address)
        .bind(&station.municipality)
        .bind(&station.province)
        .bind(&station.postal_code)
        .bind(station.latitude)
        .bind(station.longitude)
        .bind(&station.schedule)
        .bind(station.gasolina_95)
        .bind(station.gasolina_95_e10)
        .bind(station.gasolina_98)
        .bind(station.gasoleo_a)
        .bind(station.gasoleo_premium)
        .bind(station.glp)
        .bind(station.biodiesel)
        .bind(station.bioetanol)
        .bind(station.ester_metilico)
        .bind(station.hidrogeno)
        .execute(&mut **tx)
        .await?;
        Ok(false)
    }
}
