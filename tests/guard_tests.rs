// SPDX-License-Identifier: MIT

//! Auth guard tests: every failure mode of the access-token cookie check
//! maps to 401 with its own error code.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use trackgeek_api::middleware::auth::{Claims, ACCESS_TOKEN_COOKIE};

mod common;

async fn error_code(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["error"].as_str().unwrap().to_string()
}

async fn get_me_with_cookie(cookie: Option<String>) -> axum::response::Response {
    let (app, _) = common::create_test_app();

    let mut builder = Request::builder().uri("/auth/me");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_me_without_cookie_is_missing() {
    let response = get_me_with_cookie(None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "access_token_missing");
}

#[tokio::test]
async fn test_me_with_garbage_token_is_invalid() {
    let response =
        get_me_with_cookie(Some(format!("{ACCESS_TOKEN_COOKIE}=not-a-jwt"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "access_token_invalid");
}

#[tokio::test]
async fn test_me_with_expired_token_is_expired() {
    let config = trackgeek_api::config::Config::test_default();

    // Expired well past the validator's default leeway.
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_access_secret),
    )
    .unwrap();

    let response = get_me_with_cookie(Some(format!("{ACCESS_TOKEN_COOKIE}={token}"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "access_token_expired");
}

#[tokio::test]
async fn test_me_with_wrong_key_signature_is_invalid() {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some_other_signing_key_entirely!"),
    )
    .unwrap();

    let response = get_me_with_cookie(Some(format!("{ACCESS_TOKEN_COOKIE}={token}"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "access_token_invalid");
}

#[tokio::test]
async fn test_me_with_non_uuid_subject_is_invalid() {
    let config = trackgeek_api::config::Config::test_default();

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "not-a-uuid".to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_access_secret),
    )
    .unwrap();

    let response = get_me_with_cookie(Some(format!("{ACCESS_TOKEN_COOKIE}={token}"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "access_token_invalid");
}
