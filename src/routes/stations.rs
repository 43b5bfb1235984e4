// SPDX-License-Identifier: MIT

//! Gas station routes: mirrored dataset queries and the sync trigger.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Station, SyncRun};
use crate::services::fuel_feed::RawStationRecord;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many stations a proximity query returns.
const NEARBY_LIMIT: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gasolineras", get(list_stations))
        .route("/gasolineras/sync", post(sync_stations))
        .route("/gasolineras/sync/runs", get(list_sync_runs))
}

#[derive(Deserialize)]
struct StationsQuery {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Serialize)]
pub struct StationListResponse {
    pub success: bool,
    pub count: usize,
    pub gasolineras: Vec<Station>,
}

/// List mirrored stations.
///
/// Without coordinates, all stations with a known location ordered by name.
/// With `lat`/`lng`, the 50 nearest by haversine distance.
async fn list_stations(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(params): Query<StationsQuery>,
) -> Result<Json<StationListResponse>> {
    let mut gasolineras = state.db.stations_with_location().await?;

    if let (Some(lat), Some(lng)) = (params.lat, params.lng) {
        let origin = Point::new(lng, lat);
        gasolineras.sort_by(|a, b| {
            let da = Haversine.distance(origin, Point::new(a.longitude, a.latitude));
            let db = Haversine.distance(origin, Point::new(b.longitude, b.latitude));
            da.total_cmp(&db)
        });
        gasolineras.truncate(NEARBY_LIMIT);
    }

    Ok(Json(StationListResponse {
        success: true,
        count: gasolineras.len(),
        gasolineras,
    }))
}

#[derive(Deserialize, Default)]
pub struct SyncPayload {
    /// Inline raw records; when absent the feed is fetched.
    #[serde(default)]
    pub gasolineras: Option<Vec<RawStationRecord>>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub total: i32,
    pub nuevas: i32,
    pub actualizadas: i32,
    pub duracion: f64,
}

#[derive(Serialize)]
pub struct SyncErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Run a station dataset synchronization.
///
/// The body may inline raw records under `gasolineras`; otherwise the
/// configured feed is fetched. A failure returns `{success: false, message}`
/// with nothing committed.
async fn sync_stations(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    payload: Option<Json<SyncPayload>>,
) -> Response {
    let inline = payload.and_then(|Json(p)| p.gasolineras);

    let outcome = match inline {
        Some(records) => state.sync_service.run_with_records(records).await,
        None => state.sync_service.run().await,
    };

    match outcome {
        Ok(outcome) => Json(SyncResponse {
            success: true,
            total: outcome.total,
            nuevas: outcome.inserted,
            actualizadas: outcome.updated,
            duracion: outcome.duration_seconds,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Station sync failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(SyncErrorResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
pub struct SyncRunListResponse {
    pub success: bool,
    pub runs: Vec<SyncRun>,
}

/// Most recent sync audit rows, newest first.
async fn list_sync_runs(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<SyncRunListResponse>> {
    let runs = state.db.recent_sync_runs(20).await?;
    Ok(Json(SyncRunListResponse {
        success: true,
        runs,
    }))
}
