// SPDX-License-Identifier: MIT

//! Vehicle routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{vehicle, Vehicle};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/insertCar", post(create_vehicle))
        .route("/coches", get(list_vehicles))
        .route("/coches/{id}", delete(delete_vehicle))
}

#[derive(Serialize)]
pub struct VehicleListResponse {
    pub success: bool,
    pub count: usize,
    pub coches: Vec<Vehicle>,
}

/// List the user's vehicles.
async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<VehicleListResponse>> {
    let user_id = state.db.user_id_by_email(&user.email).await?;
    let coches = state.db.vehicles_for_user(user_id).await?;

    Ok(Json(VehicleListResponse {
        success: true,
        count: coches.len(),
        coches,
    }))
}

#[derive(Deserialize, Validate)]
pub struct CreateVehiclePayload {
    #[validate(length(min = 1, message = "make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "fuel_type is required"))]
    pub fuel_type: String,
    pub initial_odometer: Option<f64>,
    pub tank_capacity: Option<f64>,
    pub theoretical_consumption: Option<f64>,
    pub last_oil_change_date: Option<NaiveDate>,
    pub last_oil_change_odometer: Option<f64>,
    pub oil_change_interval_km: Option<f64>,
    pub oil_change_interval_months: Option<i32>,
}

#[derive(Serialize)]
pub struct CreateVehicleResponse {
    pub success: bool,
    pub id: i64,
}

/// Register a vehicle for the user.
///
/// Make + model must be unique per user; oil change intervals fall back to
/// the standard defaults when omitted.
async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateVehiclePayload>,
) -> Result<Json<CreateVehicleResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = state.db.user_id_by_email(&user.email).await?;

    if state
        .db
        .vehicle_exists(user_id, &payload.make, &payload.model)
        .await?
    {
        return Err(AppError::Conflict(format!(
            "Vehicle {} {} already registered",
            payload.make, payload.model
        )));
    }

    let id = state
        .db
        .insert_vehicle(
            user_id,
            &payload.make,
            &payload.model,
            &payload.fuel_type,
            payload.initial_odometer,
            payload.tank_capacity,
            payload.theoretical_consumption,
            payload.last_oil_change_date,
            payload.last_oil_change_odometer,
            payload
                .oil_change_interval_km
                .unwrap_or(vehicle::DEFAULT_OIL_INTERVAL_KM),
            payload
                .oil_change_interval_months
                .unwrap_or(vehicle::DEFAULT_OIL_INTERVAL_MONTHS),
        )
        .await?;

    tracing::info!(user_id, vehicle_id = id, "Vehicle created");
    Ok(Json(CreateVehicleResponse { success: true, id }))
}

#[derive(Serialize)]
pub struct DeleteVehicleResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a vehicle the user owns.
async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteVehicleResponse>> {
    let user_id = state.db.user_id_by_email(&user.email).await?;

    let owner = state
        .db
        .vehicle_owner(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", id)))?;

    if owner != user_id {
        return Err(AppError::Forbidden(
            "Vehicle belongs to another user".to_string(),
        ));
    }

    state.db.delete_vehicle(id).await?;
    tracing::info!(user_id, vehicle_id = id, "Vehicle deleted");

    Ok(Json(DeleteVehicleResponse {
        success: true,
        message: "Coche eliminado".to_string(),
    }))
}
