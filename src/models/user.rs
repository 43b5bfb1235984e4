//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User row.
///
/// Users are never hard-deleted: deactivation flips `active` to false and
/// leaves vehicles and receipts in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Login identity, unique.
    pub email: String,
    /// Display name (may be empty).
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
