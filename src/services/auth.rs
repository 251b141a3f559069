// SPDX-License-Identifier: MIT

//! Auth service: provider logins, email magic links, token issuance and
//! single-use refresh rotation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Db;
use crate::error::AppError;
use crate::middleware::auth::{create_token, ACCESS_TOKEN_TTL_SECS};
use crate::models::TokenPair;
use crate::services::oauth::OAuthProvider;
use crate::services::{Mailer, UserService};

/// Refresh tokens live for 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Email sign-in tokens live for 3 hours.
pub const EMAIL_TOKEN_TTL_SECS: i64 = 3 * 60 * 60;

/// Claims of the signed email sign-in token.
#[derive(Debug, Serialize, Deserialize)]
struct EmailClaims {
    /// The email address being signed in
    sub: String,
    iat: usize,
    exp: usize,
}

/// Login flows and session token lifecycle.
#[derive(Clone)]
pub struct AuthService {
    db: Db,
    users: UserService,
    mailer: Mailer,
    api_url: String,
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    email_secret: Vec<u8>,
}

impl AuthService {
    pub fn new(
        db: Db,
        users: UserService,
        mailer: Mailer,
        api_url: String,
        access_secret: Vec<u8>,
        refresh_secret: Vec<u8>,
        email_secret: Vec<u8>,
    ) -> Self {
        Self {
            db,
            users,
            mailer,
            api_url,
            access_secret,
            refresh_secret,
            email_secret,
        }
    }

    // ─── Provider Login ──────────────────────────────────────────

    /// Exchange an authorization code, map the provider profile to a local
    /// user, link the provider id (first login wins) and issue tokens.
    pub async fn login_with_provider(
        &self,
        provider: &impl OAuthProvider,
        code: &str,
    ) -> Result<TokenPair, AppError> {
        let profile = provider.exchange_code(code).await?;

        let user = self
            .users
            .create_or_get_user(
                &profile.email,
                profile.name.as_deref(),
                profile.avatar_url.as_deref(),
            )
            .await?;

        self.db
            .link_provider(provider.kind(), user.id, &profile.id)
            .await?;

        tracing::info!(user_id = %user.id, provider = %provider.kind(), "Provider login");

        self.issue_tokens(user.id).await
    }

    // ─── Email Login ─────────────────────────────────────────────

    /// Sign a short-lived token embedding the email and send the sign-in
    /// link. No user row is created at this stage.
    pub async fn request_email_login(&self, email: &str) -> Result<(), AppError> {
        let now = Utc::now().timestamp() as usize;
        let claims = EmailClaims {
            sub: email.to_string(),
            iat: now,
            exp: now + EMAIL_TOKEN_TTL_SECS as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.email_secret),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Email token signing failed: {}", e)))?;

        let link = format!("{}/auth/email/login?code={}", self.api_url, token);
        self.mailer.send_login_link(email, &link).await
    }

    /// Verify the emailed sign-in token and log the user in.
    pub async fn login_with_email(&self, code: &str) -> Result<TokenPair, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<EmailClaims>(
            code,
            &DecodingKey::from_secret(&self.email_secret),
            &validation,
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Email sign-in token rejected");
            AppError::InvalidEmailCode
        })?;

        let email = data.claims.sub;
        let user = self.users.create_or_get_user(&email, None, None).await?;

        tracing::info!(user_id = %user.id, "Email login");

        self.issue_tokens(user.id).await
    }

    // ─── Token Issuance & Rotation ───────────────────────────────

    /// Issue a fresh access + refresh pair, persisting the refresh token.
    pub async fn issue_tokens(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        let subject = user_id.to_string();

        let access_token = create_token(&subject, &self.access_secret, ACCESS_TOKEN_TTL_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Access token signing failed: {}", e)))?;
        let refresh_token = create_token(&subject, &self.refresh_secret, REFRESH_TOKEN_TTL_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Refresh token signing failed: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);
        self.db
            .insert_refresh_token(&refresh_token, user_id, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new pair. Single-use: the old row is
    /// deleted in the same transaction that stores its replacement.
    ///
    /// An expired signature deletes the stored row and fails even though
    /// the row existed (expiry is authoritative).
    pub async fn refresh_tokens(&self, old_token: &str) -> Result<TokenPair, AppError> {
        let row = self
            .db
            .get_refresh_token(old_token)
            .await?
            .ok_or(AppError::RefreshTokenInvalid)?;

        let validation = Validation::new(Algorithm::HS256);
        if let Err(e) = decode::<crate::middleware::auth::Claims>(
            old_token,
            &DecodingKey::from_secret(&self.refresh_secret),
            &validation,
        ) {
            return match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    self.db.delete_refresh_token(old_token).await?;
                    tracing::info!(user_id = %row.user_id, "Expired refresh token revoked");
                    Err(AppError::RefreshTokenExpired)
                }
                _ => {
                    tracing::warn!(user_id = %row.user_id, error = %e, "Refresh token rejected");
                    Err(AppError::RefreshTokenInvalid)
                }
            };
        }

        let subject = row.user_id.to_string();
        let access_token = create_token(&subject, &self.access_secret, ACCESS_TOKEN_TTL_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Access token signing failed: {}", e)))?;
        let refresh_token = create_token(&subject, &self.refresh_secret, REFRESH_TOKEN_TTL_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Refresh token signing failed: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);
        self.db
            .rotate_refresh_token(old_token, &refresh_token, row.user_id, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
