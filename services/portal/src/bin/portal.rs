//! services/portal/src/bin/portal.rs

use portal_lib::{
    adapters::{HttpDoctorGateway, PgPortalDatabase},
    config::Config,
    error::PortalError,
    web::{build_router, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), PortalError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db = Arc::new(PgPortalDatabase::new(db_pool));
    info!("Running database migrations...");
    db.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Doctor Service Gateway ---
    let doctors = Arc::new(HttpDoctorGateway::new(
        &config.doctor_service_url,
        config.remote_timeout,
    )?);
    info!("Doctor service gateway points at {}", config.doctor_service_url);

    // --- 4. Build the Shared AppState and Router ---
    let state = Arc::new(AppState {
        db,
        doctors,
        config: config.clone(),
    });
    let app = build_router(state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
