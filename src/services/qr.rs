//! QR image collaborator backed by a URL-addressable renderer.

#[cfg(test)]
#[path = "qr_test.rs"]
mod qr_test;

use crate::config::QrConfig;
use crate::net::api::{ApiError, QrGenerator};
use crate::net::types::QrImage;

/// Builds image URLs for a remote QR renderer. No network call is made here;
/// the browser (or any image consumer) fetches the URL.
pub struct UrlQrGenerator {
    config: QrConfig,
}

impl UrlQrGenerator {
    #[must_use]
    pub fn new(config: QrConfig) -> Self {
        Self { config }
    }

    fn image_url(&self, payload: &str) -> Result<String, ApiError> {
        let size = format!("{0}x{0}", self.config.size);
        reqwest::Url::parse_with_params(&self.config.base_url, &[("size", size.as_str()), ("data", payload)])
            .map(String::from)
            .map_err(|e| ApiError::Qr(e.to_string()))
    }
}

#[async_trait::async_trait]
impl QrGenerator for UrlQrGenerator {
    async fn generate(&self, payload: &str) -> Result<QrImage, ApiError> {
        if payload.trim().is_empty() {
            return Err(ApiError::Qr("empty payload".into()));
        }
        self.image_url(payload).map(QrImage)
    }
}
