// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::oauth::ProviderKind;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Access token cookie missing")]
    AccessTokenMissing,

    #[error("Access token expired")]
    AccessTokenExpired,

    #[error("Access token invalid")]
    AccessTokenInvalid,

    #[error("Refresh token invalid")]
    RefreshTokenInvalid,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid {0} authorization code")]
    InvalidProviderCode(ProviderKind),

    #[error("Invalid email sign-in code")]
    InvalidEmailCode,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Image type not supported")]
    ImageTypeNotSupported,

    #[error("Failed to upload image")]
    ImageUploadFailed,

    #[error("Failed to send email: {0}")]
    Email(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code used in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AccessTokenMissing => "access_token_missing",
            AppError::AccessTokenExpired => "access_token_expired",
            AppError::AccessTokenInvalid => "access_token_invalid",
            AppError::RefreshTokenInvalid => "refresh_token_invalid",
            AppError::RefreshTokenExpired => "refresh_token_expired",
            AppError::InvalidProviderCode(ProviderKind::Google) => "invalid_google_code",
            AppError::InvalidProviderCode(ProviderKind::Discord) => "invalid_discord_code",
            AppError::InvalidProviderCode(ProviderKind::Github) => "invalid_github_code",
            AppError::InvalidEmailCode => "invalid_email_code",
            AppError::UserNotFound => "user_not_found",
            AppError::UsernameTaken => "username_already_exists",
            AppError::ImageTypeNotSupported => "image_type_not_supported",
            AppError::ImageUploadFailed => "failed_to_upload_image",
            AppError::Email(_) => "email_error",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::AccessTokenMissing
            | AppError::AccessTokenExpired
            | AppError::AccessTokenInvalid
            | AppError::RefreshTokenInvalid
            | AppError::RefreshTokenExpired
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::InvalidProviderCode(_)
            | AppError::InvalidEmailCode
            | AppError::ImageTypeNotSupported
            | AppError::ImageUploadFailed
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Email(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => Some(msg.clone()),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            AppError::Email(msg) => {
                tracing::error!(error = %msg, "Email delivery error");
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
