// SPDX-License-Identifier: MIT

//! Discord OAuth provider.

use serde::Deserialize;

use super::{invalid_code, json_or_invalid_code, OAuthProvider, ProviderKind, ProviderProfile};
use crate::config::OAuthCredentials;
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const PROFILE_URL: &str = "https://discord.com/api/users/@me";

#[derive(Clone)]
pub struct DiscordProvider {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

impl DiscordProvider {
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
    username: String,
    global_name: Option<String>,
    /// Requires the `email` scope; still nullable for unverified accounts.
    email: Option<String>,
    avatar: Option<String>,
}

impl Profile {
    fn avatar_url(&self) -> Option<String> {
        self.avatar
            .as_ref()
            .map(|hash| format!("https://cdn.discordapp.com/avatars/{}/{}.png", self.id, hash))
    }
}

impl OAuthProvider for DiscordProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Discord
    }

    fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            AUTHORIZE_URL,
            self.credentials.client_id,
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode("identify email"),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, AppError> {
        let kind = self.kind();

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "authorization_code"),
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
            .send()
            .await
            .map_err(|e| invalid_code(kind, "Profile request failed", e))?;

        let profile: Profile = json_or_invalid_code(kind, response).await?;

        let avatar_url = profile.avatar_url();
        let email = profile.email.ok_or_else(|| {
            invalid_code(kind, "Profile has no email", "account without a verified email")
        })?;

        Ok(ProviderProfile {
            id: profile.id,
            email,
            name: profile.global_name.or(Some(profile.username)),
            avatar_url,
        })
    }
}
