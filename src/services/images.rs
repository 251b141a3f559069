// SPDX-License-Identifier: MIT

//! ImgBB image hosting client.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::error::AppError;

const BASE_URL: &str = "https://api.imgbb.com/1";

/// ImgBB upload client.
#[derive(Clone)]
pub struct ImageService {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    image: UploadImage,
}

#[derive(Deserialize)]
struct UploadImage {
    url: String,
}

impl ImageService {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Upload raw image bytes, returning the hosted URL.
    pub async fn upload(&self, bytes: &[u8]) -> Result<String, AppError> {
        let url = format!("{}/upload?key={}", BASE_URL, self.api_key);

        let response = self
            .http
            .post(&url)
            .form(&[("image", STANDARD.encode(bytes))])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "ImgBB upload request failed");
                AppError::ImageUploadFailed
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body, "ImgBB rejected upload");
            return Err(AppError::ImageUploadFailed);
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse ImgBB response");
            AppError::ImageUploadFailed
        })?;

        Ok(parsed.data.image.url)
    }
}
