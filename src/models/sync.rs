// SPDX-License-Identifier: MIT

//! Audit record for station synchronization runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Every record reconciled cleanly.
    Success,
    /// The batch committed but some records were skipped with errors.
    Partial,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Partial => "partial",
        }
    }
}

/// One row in `sync_runs`, written once per committed sync pass and never
/// updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncRun {
    pub id: i64,
    pub total: i32,
    pub inserted: i32,
    pub updated: i32,
    pub errors: i32,
    pub duration_seconds: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
