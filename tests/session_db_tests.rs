// SPDX-License-Identifier: MIT

//! Database-backed session tests. These run against a real Postgres
//! instance and are skipped when DATABASE_URL is not set.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use trackgeek_api::error::AppError;
use trackgeek_api::middleware::auth::Claims;
use trackgeek_api::services::oauth::ProviderKind;

mod common;

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@trackgeek.test", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_first_login_creates_user_and_is_idempotent() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let email = unique_email("first");
    let created = state
        .users
        .create_or_get_user(&email, Some("Test Person"), None)
        .await
        .unwrap();

    assert_eq!(created.email, email);
    assert_eq!(created.name, "Test Person");

    let fetched = state
        .users
        .create_or_get_user(&email, Some("Different Name"), None)
        .await
        .unwrap();

    // Second login finds the existing row, it does not recreate it.
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Test Person");
}

#[tokio::test]
async fn test_username_collision_gets_numeric_suffix() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    // Same local part, different domains.
    let local = format!("clash{}", uuid::Uuid::new_v4().simple());
    let first = state
        .users
        .create_or_get_user(&format!("{local}@one.test"), None, None)
        .await
        .unwrap();
    let second = state
        .users
        .create_or_get_user(&format!("{local}@two.test"), None, None)
        .await
        .unwrap();

    assert_eq!(first.username, local);
    assert_ne!(second.username, first.username);
    assert!(second.username.starts_with(&local));
    let suffix = &second.username[local.len()..];
    assert!(!suffix.is_empty());
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let user = state
        .users
        .create_or_get_user(&unique_email("rotate"), None, None)
        .await
        .unwrap();

    let pair = state.auth.issue_tokens(user.id).await.unwrap();

    let rotated = state.auth.refresh_tokens(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    // The old token was consumed by the rotation.
    let replay = state.auth.refresh_tokens(&pair.refresh_token).await;
    assert!(matches!(replay, Err(AppError::RefreshTokenInvalid)));

    // The replacement still works.
    state.auth.refresh_tokens(&rotated.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_expired_refresh_token_is_revoked() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let user = state
        .users
        .create_or_get_user(&unique_email("expired"), None, None)
        .await
        .unwrap();

    // A stored row whose signature expired well past the decode leeway.
    let config = trackgeek_api::config::Config::test_default();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_refresh_secret),
    )
    .unwrap();

    state
        .db
        .insert_refresh_token(&token, user.id, chrono::Utc::now() - chrono::Duration::hours(1))
        .await
        .unwrap();

    let result = state.auth.refresh_tokens(&token).await;
    assert!(matches!(result, Err(AppError::RefreshTokenExpired)));

    // Expiry is authoritative: the stored row was deleted, so a retry now
    // fails as unknown rather than expired.
    assert!(state.db.get_refresh_token(&token).await.unwrap().is_none());
    let retry = state.auth.refresh_tokens(&token).await;
    assert!(matches!(retry, Err(AppError::RefreshTokenInvalid)));
}

#[tokio::test]
async fn test_rotation_aborts_when_old_token_already_consumed() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let user = state
        .users
        .create_or_get_user(&unique_email("consumed"), None, None)
        .await
        .unwrap();

    let pair = state.auth.issue_tokens(user.id).await.unwrap();

    // Another exchange got there first and consumed the row.
    state
        .db
        .delete_refresh_token(&pair.refresh_token)
        .await
        .unwrap();

    let replacement = format!("replacement-{}", uuid::Uuid::new_v4().simple());
    let result = state
        .db
        .rotate_refresh_token(
            &pair.refresh_token,
            &replacement,
            user.id,
            chrono::Utc::now() + chrono::Duration::days(7),
        )
        .await;
    assert!(matches!(result, Err(AppError::RefreshTokenInvalid)));

    // The aborted rotation must not have stored the replacement.
    assert!(state
        .db
        .get_refresh_token(&replacement)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unknown_refresh_token_is_invalid() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let result = state.auth.refresh_tokens("never-issued").await;
    assert!(matches!(result, Err(AppError::RefreshTokenInvalid)));
}

#[tokio::test]
async fn test_provider_link_first_login_wins() {
    require_database!();
    let (_, state) = common::create_test_app_with_db().await;

    let user = state
        .users
        .create_or_get_user(&unique_email("link"), None, None)
        .await
        .unwrap();

    let first_id = uuid::Uuid::new_v4().to_string();
    let second_id = uuid::Uuid::new_v4().to_string();

    state
        .db
        .link_provider(ProviderKind::Google, user.id, &first_id)
        .await
        .unwrap();
    state
        .db
        .link_provider(ProviderKind::Google, user.id, &second_id)
        .await
        .unwrap();

    let stored = state.db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.google_id.as_deref(), Some(first_id.as_str()));
}

#[tokio::test]
async fn test_public_profile_lookup() {
    require_database!();
    let (app, state) = common::create_test_app_with_db().await;

    let user = state
        .users
        .create_or_get_user(&unique_email("profile"), Some("Profiled"), None)
        .await
        .unwrap();

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/user/{}", user.username))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["user"]["username"], user.username.as_str());
    // Public profiles never expose the email address.
    assert!(json["user"].get("email").is_none());
}
