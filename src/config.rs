// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;

/// OAuth client credentials for one identity provider.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Public base URL of this API (used in emailed sign-in links)
    pub api_url: String,
    /// Web application URL (CORS origin, redirects, popup postMessage target)
    pub web_url: String,
    /// Postgres connection string
    pub database_url: String,
    /// "development" or "production" (controls Secure cookie attribute)
    pub environment: String,

    /// Access token signing key (1 day tokens)
    pub jwt_access_secret: Vec<u8>,
    /// Refresh token signing key (7 day tokens)
    pub jwt_refresh_secret: Vec<u8>,
    /// Email sign-in token signing key (3 hour tokens)
    pub jwt_email_secret: Vec<u8>,

    pub google: OAuthCredentials,
    pub discord: OAuthCredentials,
    pub github: OAuthCredentials,

    /// Resend API key for transactional email
    pub resend_api_key: String,
    /// From address for sign-in emails
    pub email_from: String,
    /// ImgBB API key for avatar/banner hosting
    pub imgbb_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let web_url = env::var("WEB_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            api_url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            environment: env::var("NODE_ENV")
                .or_else(|_| env::var("ENVIRONMENT"))
                .unwrap_or_else(|_| "development".to_string()),

            jwt_access_secret: require(env::var("JWT_ACCESS_SECRET"), "JWT_ACCESS_SECRET")?
                .into_bytes(),
            jwt_refresh_secret: require(env::var("JWT_REFRESH_SECRET"), "JWT_REFRESH_SECRET")?
                .into_bytes(),
            jwt_email_secret: require(env::var("JWT_EMAIL_SECRET"), "JWT_EMAIL_SECRET")?
                .into_bytes(),

            google: oauth_credentials("GOOGLE", &web_url)?,
            discord: oauth_credentials("DISCORD", &web_url)?,
            github: oauth_credentials("GITHUB", &web_url)?,

            resend_api_key: require(env::var("RESEND_API_KEY"), "RESEND_API_KEY")?,
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "TrackGeek <login@trackgeek.app>".to_string()),
            imgbb_api_key: require(env::var("IMGBB_API_KEY"), "IMGBB_API_KEY")?,

            web_url,
        })
    }

    /// Secure cookies and strict origins only in production.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        let test_oauth = |name: &str| OAuthCredentials {
            client_id: format!("test_{name}_client_id"),
            client_secret: format!("test_{name}_client_secret"),
            redirect_uri: format!("http://localhost:5173/auth/{name}/callback"),
        };

        Self {
            port: 8080,
            api_url: "http://localhost:8080".to_string(),
            web_url: "http://localhost:5173".to_string(),
            database_url: "postgres://localhost/trackgeek_test".to_string(),
            environment: "development".to_string(),
            jwt_access_secret: b"test_access_key_32_bytes_minimum".to_vec(),
            jwt_refresh_secret: b"test_refresh_key_32_bytes_minimu".to_vec(),
            jwt_email_secret: b"test_email_key_32_bytes_minimum!".to_vec(),
            google: test_oauth("google"),
            discord: test_oauth("discord"),
            github: test_oauth("github"),
            resend_api_key: "test_resend_key".to_string(),
            email_from: "TrackGeek <login@trackgeek.test>".to_string(),
            imgbb_api_key: "test_imgbb_key".to_string(),
        }
    }
}

/// Load one provider's credentials from `<PREFIX>_CLIENT_ID` / `<PREFIX>_CLIENT_SECRET`,
/// with the redirect URI defaulting to the web app's callback route.
fn oauth_credentials(prefix: &str, web_url: &str) -> Result<OAuthCredentials, ConfigError> {
    let id_var = format!("{prefix}_CLIENT_ID");
    let secret_var = format!("{prefix}_CLIENT_SECRET");

    Ok(OAuthCredentials {
        client_id: env::var(&id_var).map_err(|_| ConfigError::Missing(id_var))?,
        client_secret: env::var(&secret_var).map_err(|_| ConfigError::Missing(secret_var))?,
        redirect_uri: env::var(format!("{prefix}_REDIRECT_URI")).unwrap_or_else(|_| {
            format!("{}/auth/{}/callback", web_url, prefix.to_lowercase())
        }),
    })
}

fn require(value: Result<String, env::VarError>, name: &str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_names_the_variable() {
        let err = require(Err(env::VarError::NotPresent), "JWT_ACCESS_SECRET").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: JWT_ACCESS_SECRET"
        );
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/trackgeek");
        env::set_var("JWT_ACCESS_SECRET", "test_access_key_32_bytes_minimum");
        env::set_var("JWT_REFRESH_SECRET", "test_refresh_key_32_bytes_minimu");
        env::set_var("JWT_EMAIL_SECRET", "test_email_key_32_bytes_minimum!");
        env::set_var("GOOGLE_CLIENT_ID", "gid");
        env::set_var("GOOGLE_CLIENT_SECRET", "gsecret");
        env::set_var("DISCORD_CLIENT_ID", "did");
        env::set_var("DISCORD_CLIENT_SECRET", "dsecret");
        env::set_var("GITHUB_CLIENT_ID", "ghid");
        env::set_var("GITHUB_CLIENT_SECRET", "ghsecret");
        env::set_var("RESEND_API_KEY", "rkey");
        env::set_var("IMGBB_API_KEY", "ikey");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.google.client_id, "gid");
        assert!(!config.is_production());
        assert_eq!(
            config.github.redirect_uri,
            "http://localhost:5173/auth/github/callback"
        );
    }
}
