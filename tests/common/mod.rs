// SPDX-License-Identifier: MIT

use std::sync::Arc;

use trackgeek_api::config::Config;
use trackgeek_api::db::Db;
use trackgeek_api::routes::create_router;
use trackgeek_api::AppState;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is available.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// Create a test database connection (runs migrations).
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Db::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// Create a test app with an offline mock database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), Db::new_mock()));
    (create_router(state.clone()), state)
}

/// Create a test app backed by a real database connection.
#[allow(dead_code)]
pub async fn create_test_app_with_db() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), test_db().await));
    (create_router(state.clone()), state)
}
