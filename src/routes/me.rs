// SPDX-License-Identifier: MIT

//! Authenticated profile routes (require the auth guard).

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{PrivateProfile, User, UserUpdate};
use crate::AppState;

/// Upload size cap, matching the original 5 MiB limit.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Profile routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(me_get).patch(me_patch))
        .route("/auth/me/avatar", post(avatar_post).delete(avatar_delete))
        .route("/auth/me/banner", post(banner_post).delete(banner_delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Serialize)]
struct MeResponse {
    user: PrivateProfile,
}

/// Current user profile (provider ids omitted).
async fn me_get(Extension(user): Extension<User>) -> Json<MeResponse> {
    Json(MeResponse { user: user.into() })
}

/// Partial profile update.
async fn me_patch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(update): Json<UserUpdate>,
) -> Result<StatusCode> {
    state.users.update_user(user.id, &update).await?;
    Ok(StatusCode::OK)
}

async fn avatar_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<StatusCode> {
    let bytes = read_image_field(multipart).await?;
    state.users.update_user_avatar(user.id, &bytes).await?;
    Ok(StatusCode::OK)
}

async fn avatar_delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<StatusCode> {
    state.users.delete_user_avatar(user.id).await?;
    Ok(StatusCode::OK)
}

async fn banner_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<StatusCode> {
    let bytes = read_image_field(multipart).await?;
    state.users.update_user_banner(user.id, &bytes).await?;
    Ok(StatusCode::OK)
}

async fn banner_delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<StatusCode> {
    state.users.delete_user_banner(user.id).await?;
    Ok(StatusCode::OK)
}

/// Pull the `file` field out of a multipart upload, rejecting unsupported
/// image types before reading the body.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let supported = field
            .file_name()
            .map(has_supported_extension)
            .unwrap_or(false);
        if !supported {
            return Err(AppError::ImageTypeNotSupported);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Upload too large or unreadable: {}", e)))?;

        return Ok(bytes.to_vec());
    }

    Err(AppError::BadRequest("Missing file field".to_string()))
}

fn has_supported_extension(file_name: &str) -> bool {
    let lowered = file_name.to_lowercase();
    ["jpg", "jpeg", "png", "gif"]
        .iter()
        .any(|ext| lowered.ends_with(&format!(".{ext}")))
}
