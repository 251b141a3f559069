// SPDX-License-Identifier: MIT

//! User service: find-or-create, profile mutations, avatar import.

use rand::Rng;
use uuid::Uuid;

use crate::db::Db;
use crate::email::{extract_name_from_email, extract_username_from_email};
use crate::error::AppError;
use crate::models::{User, UserUpdate};
use crate::services::ImageService;

/// User lookup and mutation operations.
#[derive(Clone)]
pub struct UserService {
    db: Db,
    http: reqwest::Client,
    images: ImageService,
}

impl UserService {
    pub fn new(db: Db, images: ImageService) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            images,
        }
    }

    /// Find a user by email, creating the row on first login.
    ///
    /// The username is derived from the email local-part; a random numeric
    /// suffix resolves collisions. A concurrent first-login race is
    /// resolved by the unique constraint: if the insert loses, the winner's
    /// row is re-read. When the caller supplies a provider avatar URL and
    /// the user has none yet, the image is imported best-effort.
    pub async fn create_or_get_user(
        &self,
        email: &str,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, AppError> {
        let mut user = match self.db.get_user_by_email(email).await? {
            Some(user) => user,
            None => self.create_user(email, name).await?,
        };

        if let Some(remote_url) = avatar_url {
            if user.avatar_url.is_none() {
                // Non-fatal side effect: a failed import never fails the login.
                match self.import_avatar(user.id, remote_url).await {
                    Ok(hosted_url) => user.avatar_url = Some(hosted_url),
                    Err(e) => {
                        tracing::warn!(
                            user_id = %user.id,
                            error = %e,
                            "Failed to import provider avatar"
                        );
                    }
                }
            }
        }

        Ok(user)
    }

    async fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, AppError> {
        let mut username = extract_username_from_email(email);

        if self.db.get_user_by_username(&username).await?.is_some() {
            let suffix: u16 = rand::thread_rng().gen_range(0..10000);
            username.push_str(&suffix.to_string());
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => extract_name_from_email(email),
        };

        match self.db.try_insert_user(email, &username, &name).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User created");
                Ok(user)
            }
            // Lost a concurrent first-login race; the winner's row exists now.
            None => self
                .db
                .get_user_by_email(email)
                .await?
                .ok_or_else(|| AppError::Database("User insert raced and re-read failed".to_string())),
        }
    }

    /// Fetch a remote avatar and re-host it, returning the hosted URL.
    async fn import_avatar(&self, user_id: Uuid, remote_url: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(remote_url)
            .send()
            .await
            .map_err(|e| AppError::BadRequest(format!("Avatar fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::BadRequest(format!(
                "Avatar fetch failed: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Avatar fetch failed: {}", e)))?;

        let hosted_url = self.images.upload(&bytes).await?;
        self.db.set_avatar_url(user_id, Some(&hosted_url)).await?;

        Ok(hosted_url)
    }

    /// Apply a partial profile update, enforcing username uniqueness.
    pub async fn update_user(&self, user_id: Uuid, update: &UserUpdate) -> Result<(), AppError> {
        if update.is_empty() {
            return Ok(());
        }

        if let Some(username) = &update.username {
            if let Some(existing) = self.db.get_user_by_username(username).await? {
                if existing.id != user_id {
                    return Err(AppError::UsernameTaken);
                }
            }
        }

        self.db.update_user(user_id, update).await
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.db.get_user_by_id(user_id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.db.get_user_by_username(username).await
    }

    /// Upload new avatar bytes and store the hosted URL.
    pub async fn update_user_avatar(&self, user_id: Uuid, bytes: &[u8]) -> Result<(), AppError> {
        let url = self.images.upload(bytes).await?;
        self.db.set_avatar_url(user_id, Some(&url)).await
    }

    pub async fn delete_user_avatar(&self, user_id: Uuid) -> Result<(), AppError> {
        self.db.set_avatar_url(user_id, None).await
    }

    /// Upload new banner bytes and store the hosted URL.
    pub async fn update_user_banner(&self, user_id: Uuid, bytes: &[u8]) -> Result<(), AppError> {
        let url = self.images.upload(bytes).await?;
        self.db.set_banner_url(user_id, Some(&url)).await
    }

    pub async fn delete_user_banner(&self, user_id: Uuid) -> Result<(), AppError> {
        self.db.set_banner_url(user_id, None).await
    }
}
