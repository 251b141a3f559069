// SPDX-License-Identifier: MIT

//! GitHub OAuth provider.
//!
//! GitHub profiles may omit the email, so the exchange additionally calls
//! the emails endpoint and resolves the primary verified address.

use serde::Deserialize;

use super::{invalid_code, json_or_invalid_code, OAuthProvider, ProviderKind, ProviderProfile};
use crate::config::OAuthCredentials;
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const PROFILE_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";

// GitHub's API rejects requests without a User-Agent.
const USER_AGENT: &str = "trackgeek-api";

#[derive(Clone)]
pub struct GithubProvider {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

impl GithubProvider {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    /// Pick the primary verified email, falling back to any verified one.
    async fn primary_email(&self, access_token: &str) -> Result<String, AppError> {
        let kind = self.kind();

        let response = self
            .http
            .get(EMAILS_URL)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Emails request failed", e))?;

        let emails: Vec<Email> = json_or_invalid_code(kind, response).await?;

        emails
            .iter()
            .find(|e| e.primary && e.verified)
            .or_else(|| emails.iter().find(|e| e.verified))
            .map(|e| e.email.clone())
            .ok_or_else(|| {
                invalid_code(kind, "No verified email", "account without a verified email")
            })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Profile {
    id: u64,
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct Email {
    email: String,
    primary: bool,
    verified: bool,
}

impl OAuthProvider for GithubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            AUTHORIZE_URL,
            self.credentials.client_id,
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode("read:user user:email"),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, AppError> {
        let kind = self.kind();

        let response = self
            .http
            .post(TOKEN_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Token exchange request failed", e))?;

        let token: TokenResponse = json_or_invalid_code(kind, response).await?;

        let response = self
            .http
            .get(PROFILE_URL)
            .bearer_auth(&token.access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Profile request failed", e))?;

        let profile: Profile = json_or_invalid_code(kind, response).await?;
        let email = self.primary_email(&token.access_token).await?;

        Ok(ProviderProfile {
            id: profile.id.to_string(),
            email,
            name: profile.name.or(Some(profile.login)),
            avatar_url: profile.avatar_url,
        })
    }
}
