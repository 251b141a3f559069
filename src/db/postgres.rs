// SPDX-License-Identifier: MIT

//! Postgres client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, uniqueness-aware creation)
//! - Refresh tokens (single-use rotation)
//!
//! Uniqueness of email, username and provider ids is enforced by the
//! schema; callers rely on [`Db::try_insert_user`] reporting constraint
//! hits instead of taking locks.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{RefreshToken, User, UserUpdate};
use crate::services::oauth::ProviderKind;

/// Postgres database client.
#[derive(Clone)]
pub struct Db {
    pool: Option<PgPool>,
}

impl Db {
    /// Connect to Postgres and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!("Connected to Postgres");

        Ok(Self { pool: Some(pool) })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id.
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(AppError::from)
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool()?)
            .await
            .map_err(AppError::from)
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool()?)
            .await
            .map_err(AppError::from)
    }

    /// Insert a new user row.
    ///
    /// Returns `Ok(None)` when a unique constraint (email or username)
    /// rejected the insert, so the caller can resolve the race by
    /// re-reading instead of failing.
    pub async fn try_insert_user(
        &self,
        email: &str,
        username: &str,
        name: &str,
    ) -> Result<Option<User>, AppError> {
        let result = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, email, username, name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(username)
        .bind(name)
        .fetch_one(self.pool()?)
        .await;

        match result {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// Apply a partial profile update. Absent fields keep their value.
    pub async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<(), AppError> {
        sqlx::query(
            r"
            UPDATE users SET
                name = COALESCE($2, name),
                username = COALESCE($3, username),
                language = COALESCE($4, language),
                timezone = COALESCE($5, timezone),
                about = COALESCE($6, about),
                color = COALESCE($7, color),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.username.as_deref())
        .bind(update.language.as_deref())
        .bind(update.timezone.as_deref())
        .bind(update.about.as_deref())
        .bind(update.color.as_deref())
        .execute(self.pool()?)
        .await?;

        Ok(())
    }

    /// Set or clear the avatar URL.
    pub async fn set_avatar_url(&self, id: Uuid, url: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(self.pool()?)
            .await?;

        Ok(())
    }

    /// Set or clear the banner URL.
    pub async fn set_banner_url(&self, id: Uuid, url: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET banner_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(self.pool()?)
            .await?;

        Ok(())
    }

    /// Link a provider id to a user, first login wins.
    ///
    /// The `WHERE ... IS NULL` guard means an already-linked account is
    /// never overwritten; a second login with the same provider is a no-op.
    pub async fn link_provider(
        &self,
        kind: ProviderKind,
        user_id: Uuid,
        provider_id: &str,
    ) -> Result<(), AppError> {
        let query = match kind {
            ProviderKind::Google => {
                "UPDATE users SET google_id = $2, updated_at = NOW() WHERE id = $1 AND google_id IS NULL"
            }
            ProviderKind::Discord => {
                "UPDATE users SET discord_id = $2, updated_at = NOW() WHERE id = $1 AND discord_id IS NULL"
            }
            ProviderKind::Github => {
                "UPDATE users SET github_id = $2, updated_at = NOW() WHERE id = $1 AND github_id IS NULL"
            }
        };

        sqlx::query(query)
            .bind(user_id)
            .bind(provider_id)
            .execute(self.pool()?)
            .await?;

        Ok(())
    }

    // ─── Refresh Token Operations ────────────────────────────────

    /// Persist a freshly issued refresh token.
    pub async fn insert_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool()?)
            .await?;

        Ok(())
    }

    /// Look up a refresh token row by its token string.
    pub async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(self.pool()?)
            .await
            .map_err(AppError::from)
    }

    /// Delete a refresh token row (revocation / expired cleanup).
    pub async fn delete_refresh_token(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(self.pool()?)
            .await?;

        Ok(())
    }

    /// Atomically replace an exchanged refresh token with its successor.
    ///
    /// Deleting the old row and inserting the new one happen in a single
    /// transaction, so a crash mid-rotation cannot strand the session.
    /// If the old row is gone by the time the delete runs (a concurrent
    /// exchange won), the rotation fails so the token stays single-use.
    pub async fn rotate_refresh_token(
        &self,
        old_token: &str,
        new_token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool()?.begin().await?;

        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(old_token)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::RefreshTokenInvalid);
        }

        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(new_token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
