// SPDX-License-Identifier: MIT

//! Statistics routes.
//!
//! Handlers fetch the user's rows and delegate to the pure computations in
//! [`crate::services::stats`], [`crate::services::consumption`] and
//! [`crate::services::maintenance`].

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Receipt;
use crate::services::{consumption, maintenance, stats};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/estadisticas/total", get(total))
        .route("/estadisticas/mes-actual", get(current_month))
        .route("/estadisticas/promedio-mensual", get(monthly_average))
        .route("/estadisticas/anual", get(trailing_year))
        .route("/estadisticas/mes-comparacion", get(month_comparison))
        .route("/estadisticas/por-mes", get(monthly_breakdown))
        .route("/estadisticas/promedio-factura", get(receipt_averages))
        .route("/estadisticas/proyeccion-fin-mes", get(month_end_projection))
        .route("/estadisticas/consumo-real", get(real_consumption))
        .route("/estadisticas/coste-km", get(cost_per_km))
        .route("/estadisticas/mantenimiento", get(maintenance_status))
}

/// Standard statistics envelope: `{"success": true, ...payload}`.
#[derive(Serialize)]
pub struct StatsResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<StatsResponse<T>> {
    Json(StatsResponse {
        success: true,
        data,
    })
}

async fn user_receipts(state: &AppState, email: &str) -> Result<(i64, Vec<Receipt>)> {
    let user_id = state.db.user_id_by_email(email).await?;
    let receipts = state.db.receipts_for_user(user_id).await?;
    Ok((user_id, receipts))
}

async fn total(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::TotalSpend>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    Ok(ok(stats::total_spend(&receipts)))
}

async fn current_month(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::MonthSpend>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(ok(stats::current_month_spend(&receipts, today)))
}

async fn monthly_average(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::MonthlyAverage>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(ok(stats::trailing_monthly_average(&receipts, today)))
}

async fn trailing_year(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::TotalSpend>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(ok(stats::trailing_year_spend(&receipts, today)))
}

async fn month_comparison(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::MonthComparison>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(ok(stats::month_comparison(&receipts, today)))
}

/// Bare array, not the `{success, ...}` envelope: the breakdown series is
/// consumed directly by charting.
async fn monthly_breakdown(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<stats::MonthBucket>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(stats::monthly_breakdown(&receipts, today)))
}

async fn receipt_averages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::ReceiptAverages>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    Ok(ok(stats::receipt_averages(&receipts)))
}

async fn month_end_projection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<stats::MonthEndProjection>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(ok(stats::month_end_projection(&receipts, today)))
}

async fn real_consumption(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<consumption::ConsumptionReport>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    Ok(ok(consumption::consumption_report(&receipts)))
}

async fn cost_per_km(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse<consumption::ConsumptionReport>>> {
    let (_, receipts) = user_receipts(&state, &user.email).await?;
    Ok(ok(consumption::cost_per_km_report(&receipts)))
}

/// Bare array with one status object per vehicle.
async fn maintenance_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<maintenance::MaintenanceStatus>>> {
    let (user_id, receipts) = user_receipts(&state, &user.email).await?;
    let vehicles = state.db.vehicles_for_user(user_id).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(maintenance::maintenance_statuses(
        &vehicles, &receipts, today,
    )))
}
