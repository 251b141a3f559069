// SPDX-License-Identifier: MIT

//! Authentication routes: email magic links, OAuth provider logins,
//! refresh rotation and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_COOKIE};
use crate::models::TokenPair;
use crate::services::auth::REFRESH_TOKEN_TTL_SECS;
use crate::services::oauth::OAuthProvider;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/email/request", get(email_request))
        .route("/auth/email/login", get(email_login))
        .route("/auth/google/request", get(google_request))
        .route("/auth/google/login", get(google_login))
        .route("/auth/discord/request", get(discord_request))
        .route("/auth/discord/login", get(discord_login))
        .route("/auth/github/request", get(github_request))
        .route("/auth/github/login", get(github_login))
        .route("/auth/refresh", get(refresh))
        .route("/auth/logout", get(logout))
}

// ─── Cookies ─────────────────────────────────────────────────

/// Session cookie with the attributes the web app expects: readable by
/// scripts (not HttpOnly), lax same-site, secure only in production.
fn session_cookie(name: &'static str, value: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(false);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.is_production());
    cookie
}

/// Add both session cookies for a freshly issued token pair. Each cookie
/// persists for the lifetime of the token it carries.
pub(crate) fn add_session_cookies(jar: CookieJar, pair: TokenPair, config: &Config) -> CookieJar {
    let mut access = session_cookie(ACCESS_TOKEN_COOKIE, pair.access_token, config);
    access.set_max_age(time::Duration::seconds(ACCESS_TOKEN_TTL_SECS));

    let mut refresh = session_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token, config);
    refresh.set_max_age(time::Duration::seconds(REFRESH_TOKEN_TTL_SECS));

    jar.add(access).add(refresh)
}

/// Remove both session cookies, matching the creation attributes.
fn remove_session_cookies(jar: CookieJar, config: &Config) -> CookieJar {
    jar.remove(session_cookie(ACCESS_TOKEN_COOKIE, String::new(), config))
        .remove(session_cookie(REFRESH_TOKEN_COOKIE, String::new(), config))
}

// ─── Popup Pages ─────────────────────────────────────────────

enum PopupOutcome<'a> {
    Success,
    Error(&'a str),
}

/// Small HTML page rendered inside the OAuth popup. It posts a structured
/// message to the opener window and closes itself; provider failures stay
/// within the popup's lifecycle instead of surfacing raw error bodies.
fn popup_page(web_url: &str, outcome: PopupOutcome<'_>) -> Html<String> {
    let (kind, message) = match outcome {
        PopupOutcome::Success => ("SUCCESS_LOGIN", ""),
        PopupOutcome::Error(message) => ("ERROR_LOGIN", message),
    };

    let payload = serde_json::json!({ "type": kind, "message": message }).to_string();
    // Embed the payload as a JS string literal via JSON encoding.
    let literal = serde_json::Value::String(payload).to_string();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <p>Redirecting...</p>

    <script>
      window.opener.postMessage({literal}, '{web_url}');

      window.close();
    </script>
  </body>
</html>
"#
    ))
}

// ─── Email Login ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct EmailRequestParams {
    #[validate(email)]
    email: String,
}

/// Send a magic sign-in link. 200 with an empty body.
async fn email_request(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EmailRequestParams>,
) -> Result<StatusCode> {
    params
        .validate()
        .map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;

    state.auth.request_email_login(&params.email).await?;

    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
pub struct CodeParams {
    code: String,
}

/// Verify the emailed code, set cookies and redirect to the web app.
async fn email_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CodeParams>,
) -> Result<(CookieJar, Redirect)> {
    let pair = state.auth.login_with_email(&params.code).await?;
    let jar = add_session_cookies(jar, pair, &state.config);

    Ok((jar, Redirect::to(&state.config.web_url)))
}

// ─── Provider Login ──────────────────────────────────────────

#[derive(Serialize)]
struct AuthUrlResponse {
    url: String,
}

/// Shared popup-flow login: failures render the error page with HTTP 200
/// so the popup can message its opener.
async fn provider_login(
    state: &AppState,
    jar: CookieJar,
    provider: &impl OAuthProvider,
    code: &str,
) -> (CookieJar, Html<String>) {
    match state.auth.login_with_provider(provider, code).await {
        Ok(pair) => {
            let jar = add_session_cookies(jar, pair, &state.config);
            (jar, popup_page(&state.config.web_url, PopupOutcome::Success))
        }
        Err(e) => {
            tracing::error!(provider = %provider.kind(), error = %e, "Provider login failed");
            let page = popup_page(&state.config.web_url, PopupOutcome::Error(e.code()));
            (jar, page)
        }
    }
}

async fn google_request(State(state): State<Arc<AppState>>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        url: state.google.authorize_url(),
    })
}

async fn google_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CodeParams>,
) -> (CookieJar, Html<String>) {
    provider_login(&state, jar, &state.google, &params.code).await
}

async fn discord_request(State(state): State<Arc<AppState>>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        url: state.discord.authorize_url(),
    })
}

async fn discord_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CodeParams>,
) -> (CookieJar, Html<String>) {
    provider_login(&state, jar, &state.discord, &params.code).await
}

async fn github_request(State(state): State<Arc<AppState>>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        url: state.github.authorize_url(),
    })
}

async fn github_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CodeParams>,
) -> (CookieJar, Html<String>) {
    provider_login(&state, jar, &state.github, &params.code).await
}

// ─── Session Maintenance ─────────────────────────────────────

/// Rotate the token pair using the refresh-token cookie.
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let old_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::RefreshTokenInvalid)?;

    let pair = state.auth.refresh_tokens(&old_token).await?;
    let jar = add_session_cookies(jar, pair, &state.config);

    Ok((jar, StatusCode::OK))
}

/// Clear both session cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        remove_session_cookies(jar, &state.config),
        StatusCode::OK,
    )
}
