// SPDX-License-Identifier: MIT

//! OAuth identity providers.
//!
//! Each provider implements [`OAuthProvider`]: building the authorization
//! URL is pure construction, exchanging an authorization code performs the
//! token-endpoint and profile-endpoint calls. Any failure along the way
//! surfaces as a provider-specific invalid-code error; nothing is retried.

pub mod discord;
pub mod github;
pub mod google;

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::AppError;

pub use discord::DiscordProvider;
pub use github::GithubProvider;
pub use google::GoogleProvider;

/// Identity provider discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Discord,
    Github,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Google => "google",
            ProviderKind::Discord => "discord",
            ProviderKind::Github => "github",
        };
        f.write_str(name)
    }
}

/// Normalized profile returned by a successful code exchange.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Provider-side stable account id
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A provider the auth service can log users in with.
pub trait OAuthProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Build the provider's authorization URL. Pure, no side effects.
    fn authorize_url(&self) -> String;

    /// Exchange an authorization code for the provider profile.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<ProviderProfile, AppError>> + Send;
}

/// Map an outbound request failure to the provider's invalid-code error.
pub(crate) fn invalid_code(kind: ProviderKind, context: &str, err: impl std::fmt::Display) -> AppError {
    tracing::warn!(provider = %kind, error = %err, "{context}");
    AppError::InvalidProviderCode(kind)
}

/// Parse a JSON body from a provider response, treating non-2xx statuses
/// and parse failures as invalid-code errors.
pub(crate) async fn json_or_invalid_code<T: DeserializeOwned>(
    kind: ProviderKind,
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(invalid_code(
            kind,
            "Provider returned an error status",
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| invalid_code(kind, "Failed to parse provider response", e))
}
