// SPDX-License-Identifier: MIT

//! TrackGeek API Server
//!
//! Backend for TrackGeek: user authentication via email magic links and
//! Google/Discord/GitHub OAuth, plus profile and media management.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trackgeek_api::{config::Config, db::Db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting TrackGeek API");

    // Connect to Postgres and run migrations
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let port = config.port;
    let state = Arc::new(AppState::new(config, db));

    // Build router
    let app = trackgeek_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
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
                .add_directive("trackgeek_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
