// SPDX-License-Identifier: MIT

//! Fuel receipt routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Receipt;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/facturas", get(list_receipts).post(create_receipt))
        .route("/facturas/{id}", delete(delete_receipt))
}

#[derive(Serialize)]
pub struct ReceiptListResponse {
    pub success: bool,
    pub count: usize,
    pub facturas: Vec<Receipt>,
}

/// List the user's receipts, newest first.
async fn list_receipts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ReceiptListResponse>> {
    let user_id = state.db.user_id_by_email(&user.email).await?;
    let facturas = state.db.receipts_for_user(user_id).await?;

    Ok(Json(ReceiptListResponse {
        success: true,
        count: facturas.len(),
        facturas,
    }))
}

#[derive(Deserialize, Validate)]
pub struct CreateReceiptPayload {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(range(min = 0.0, message = "cost must not be negative"))]
    pub cost: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub description: String,
    pub vehicle_id: Option<i64>,
    pub image_path: Option<String>,
    #[validate(range(min = 0.0, message = "liters must not be negative"))]
    pub liters: Option<f64>,
    #[validate(range(min = 0.0, message = "odometer must not be negative"))]
    pub odometer: Option<f64>,
}

#[derive(Serialize)]
pub struct CreateReceiptResponse {
    pub success: bool,
    pub id: i64,
}

/// Record a new receipt.
async fn create_receipt(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateReceiptPayload>,
) -> Result<Json<CreateReceiptResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = state.db.user_id_by_email(&user.email).await?;

    // A receipt may reference a vehicle, but only one the user owns.
    if let Some(vehicle_id) = payload.vehicle_id {
        match state.db.vehicle_owner(vehicle_id).await? {
            Some(owner) if owner == user_id => {}
            Some(_) => {
                return Err(AppError::Forbidden(
                    "Vehicle belongs to another user".to_string(),
                ))
            }
            None => {
                return Err(AppError::NotFound(format!(
                    "Vehicle {} not found",
                    vehicle_id
                )))
            }
        }
    }

    let id = state
        .db
        .insert_receipt(
            user_id,
            payload.vehicle_id,
            &payload.title,
            payload.cost,
            payload.date,
            payload.time,
            &payload.description,
            payload.image_path.as_deref(),
            payload.liters,
            payload.odometer,
        )
        .await?;

    tracing::info!(user_id, receipt_id = id, "Receipt created");
    Ok(Json(CreateReceiptResponse { success: true, id }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a receipt the user owns.
///
/// Any stored image reference is discarded with the row; this service does
/// not manage the files themselves.
async fn delete_receipt(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let user_id = state.db.user_id_by_email(&user.email).await?;

    let (owner, _image_path) = state
        .db
        .receipt_owner(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Receipt {} not found", id)))?;

    if owner != user_id {
        return Err(AppError::Forbidden(
            "Receipt belongs to another user".to_string(),
        ));
    }

    state.db.delete_receipt(id).await?;
    tracing::info!(user_id, receipt_id = id, "Receipt deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Factura eliminada".to_string(),
    }))
}
