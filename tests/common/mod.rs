// SPDX-License-Identifier: MIT

use mygasolinera::config::Config;
use mygasolinera::db::Db;
use mygasolinera::routes::create_router;
use mygasolinera::services::{FuelFeedClient, StationSyncService};
use mygasolinera::AppState;
use std::sync::Arc;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn test_database_available() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is available.
#[macro_export]
macro_rules! require_test_database {
    () => {
        if !crate::common::test_database_available() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Create a test database connection and run migrations.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    Db::connect(&url).await.expect("Failed to connect to test database")
}

/// Create an offline database handle; queries fail fast instead of hanging.
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    Db::new_lazy("postgres://localhost:1/offline").expect("Failed to build lazy pool")
}

/// Create a test app with offline dependencies.
/// Returns the router and the JWT signing key.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Vec<u8>) {
    let config = Config::test_default();
    let signing_key = config.jwt_signing_key.clone();

    let db = test_db_offline();
    let feed = FuelFeedClient::new(&config.fuel_api_url, config.fuel_api_timeout_secs)
        .expect("Failed to build feed client");
    let sync_service = StationSyncService::new(db.clone(), feed);

    let state = Arc::new(AppState {
        config,
        db,
        sync_service,
    });

    (create_router(state), signing_key)
}

/// Create a test JWT for the given email.
#[allow(dead_code)]
pub fn create_test_jwt(email: &str, signing_key: &[u8]) -> String {
    mygasolinera::middleware::auth::create_jwt(email, signing_key).expect("Failed to create JWT")
}
