// SPDX-License-Identifier: MIT

//! User profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::State,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/usuarios", delete(deactivate_account))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub email: String,
    pub name: String,
}

/// Current user profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .db
        .get_user(&user.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.email)))?;

    Ok(Json(ProfileResponse {
        success: true,
        email: profile.email,
        name: profile.name,
    }))
}

#[derive(Serialize)]
pub struct DeactivateResponse {
    pub success: bool,
    pub message: String,
}

/// Soft-delete the user's account.
///
/// Sets `active = false`; vehicles and receipts are kept so the account can
/// be restored out of band.
async fn deactivate_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeactivateResponse>> {
    let affected = state.db.deactivate_user(&user.email).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("User {} not found", user.email)));
    }

    tracing::info!(email = %user.email, "User deactivated");
    Ok(Json(DeactivateResponse {
        success: true,
        message: "Cuenta desactivada".to_string(),
    }))
}
