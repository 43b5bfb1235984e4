// SPDX-License-Identifier: MIT

//! MyGasolinera API Server
//!
//! Records fuel receipts per user and vehicle, computes spend and
//! consumption statistics, and mirrors the Spanish government gas-station
//! price dataset.

use mygasolinera::{
    config::Config,
    db::Db,
    services::{FuelFeedClient, StationSyncService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting MyGasolinera API");

    // Connect to Postgres and run pending migrations
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database ready");

    // Fuel price feed client
    let feed = FuelFeedClient::new(&config.fuel_api_url, config.fuel_api_timeout_secs)
        .expect("Failed to build fuel feed client");
    let sync_service = StationSyncService::new(db.clone(), feed);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sync_service,
    });

    // Build router
    let app = mygasolinera::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mygasolinera=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
