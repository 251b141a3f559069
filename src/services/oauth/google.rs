// SPDX-License-Identifier: MIT

//! Google OAuth provider.

use serde::Deserialize;

use super::{invalid_code, json_or_invalid_code, OAuthProvider, ProviderKind, ProviderProfile};
use crate::config::OAuthCredentials;
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const PROFILE_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Clone)]
pub struct GoogleProvider {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

impl GoogleProvider {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Profile {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl OAuthProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            AUTHORIZE_URL,
            self.credentials.client_id,
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode("openid email profile"),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, AppError> {
        let kind = self.kind();

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Token exchange request failed", e))?;

        let token: TokenResponse = json_or_invalid_code(kind, response).await?;

        let response = self
            .http
            .get(PROFILE_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Profile request failed", e))?;

        let profile: Profile = json_or_invalid_code(kind, response).await?;

        Ok(ProviderProfile {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            avatar_url: profile.picture,
        })
    }
}
