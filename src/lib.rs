// SPDX-License-Identifier: MIT

//! MyGasolinera: fuel expense tracking and gas-station data backend.
//!
//! This crate provides the backend API for recording fuel receipts,
//! computing per-vehicle spend and consumption statistics, and keeping a
//! local mirror of the Spanish government gas-station price dataset.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::StationSyncService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub sync_service: StationSyncService,
}
