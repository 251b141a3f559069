// SPDX-License-Identifier: MIT

//! Transactional email via Resend.

use serde_json::json;

use crate::error::AppError;

const SEND_URL: &str = "https://api.resend.com/emails";

/// Resend email client.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    /// Send the magic sign-in link for an email login request.
    pub async fn send_login_link(&self, to: &str, link: &str) -> Result<(), AppError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": "Sign in to TrackGeek",
            "html": login_email_html(link),
        });

        let response = self
            .http
            .post(SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!("HTTP {}: {}", status, body)));
        }

        tracing::info!(to, "Sign-in email sent");
        Ok(())
    }
}

fn login_email_html(link: &str) -> String {
    format!(
        "<p>Click the link below to sign in to TrackGeek. \
         The link expires in 3 hours.</p>\
         <p><a href=\"{link}\">Sign in to TrackGeek</a></p>\
         <p>If you did not request this email you can safely ignore it.</p>"
    )
}
