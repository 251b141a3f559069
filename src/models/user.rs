// SPDX-License-Identifier: MIT

//! User model for storage and API views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User row as stored in Postgres.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Unique email address
    pub email: String,
    /// Unique username, derived from the email local-part
    pub username: String,
    /// Display name
    pub name: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub about: Option<String>,
    /// Profile accent color
    pub color: Option<String>,
    /// External identity links, set at most once per provider
    pub google_id: Option<String>,
    pub discord_id: Option<String>,
    pub github_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// View of the authenticated user's own profile (provider ids omitted).
#[derive(Debug, Clone, Serialize)]
pub struct PrivateProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub about: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PrivateProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            avatar_url: user.avatar_url,
            banner_url: user.banner_url,
            language: user.language,
            timezone: user.timezone,
            about: user.about,
            color: user.color,
            created_at: user.created_at,
        }
    }
}

/// Public view of a profile (email, language and provider ids omitted).
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub timezone: Option<String>,
    pub about: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            avatar_url: user.avatar_url,
            banner_url: user.banner_url,
            timezone: user.timezone,
            about: user.about,
            color: user.color,
            created_at: user.created_at,
        }
    }
}

/// Partial profile update accepted by `PATCH /auth/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub about: Option<String>,
    pub color: Option<String>,
}

impl UserUpdate {
    /// True when no field is present (the update is a no-op).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.language.is_none()
            && self.timezone.is_none()
            && self.about.is_none()
            && self.color.is_none()
    }
}
