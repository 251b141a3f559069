// SPDX-License-Identifier: MIT

//! Public profile routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::PublicProfile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/user/{username}", get(profile_get))
}

#[derive(Serialize)]
struct ProfileResponse {
    user: PublicProfile,
}

/// Public profile lookup by username (private fields omitted).
async fn profile_get(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .users
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

    Ok(Json(ProfileResponse { user: user.into() }))
}
