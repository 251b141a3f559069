// SPDX-License-Identifier: MIT

//! JWT authentication middleware (the request guard).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Access token cookie name.
pub const ACCESS_TOKEN_COOKIE: &str = "trackgeek-access-token";

/// Refresh token cookie name.
pub const REFRESH_TOKEN_COOKIE: &str = "trackgeek-refresh-token";

/// Access tokens live for 1 day.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims structure shared by access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Middleware that requires a valid access token cookie.
///
/// Verifies the cookie, resolves the user and attaches the full `User` to
/// the request extensions. Every failure maps to 401 with a specific code.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::AccessTokenMissing)?;

    let key = DecodingKey::from_secret(&state.config.jwt_access_secret);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::AccessTokenExpired,
        _ => AppError::AccessTokenInvalid,
    })?;

    let user_id =
        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::AccessTokenInvalid)?;

    let user = state
        .db
        .get_user_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Sign a token for the given subject with the given lifetime.
pub fn create_token(subject: &str, signing_key: &[u8], ttl_secs: i64) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl_secs as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
