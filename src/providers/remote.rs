//! Remote matting service over HTTP
//!
//! The request is a multipart POST carrying the PNG-encoded image, the
//! requested output size and format, and the background color (omitted for a
//! transparent background). The credential travels in the `X-Api-Key` header.

use super::BackgroundRemovalProvider;
use crate::config::ProviderSettings;
use crate::error::{Result, StudioError};
use crate::services::ImageCodec;
use crate::types::{BackgroundTarget, ChannelMode, RasterBuffer};
use image::RgbImage;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

/// Header that carries the service credential
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for a remove.bg-compatible matting endpoint
pub struct RemoteMattingService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemoteMattingService {
    /// Create a client; a missing or blank key leaves the service unconfigured
    ///
    /// # Errors
    /// - `NetworkError` when the HTTP client cannot be built
    pub fn new<S: Into<String>>(
        api_key: Option<String>,
        endpoint: S,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StudioError::network_error("build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout,
        })
    }

    /// # Errors
    /// - `NetworkError` when the HTTP client cannot be built
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        Self::new(
            settings.api_key.clone(),
            settings.endpoint.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Whether a credential is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(png: Vec<u8>, target: &BackgroundTarget) -> Result<Form> {
        let image_part = Part::bytes(png)
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| StudioError::network_error("build multipart body", e))?;

        let mut form = Form::new()
            .part("image_file", image_part)
            .text("size", "auto")
            .text("format", "auto");
        if let Some(hex) = target.to_hex() {
            form = form.text("bg_color", hex);
        }
        Ok(form)
    }

    fn map_send_error(&self, error: &reqwest::Error) -> StudioError {
        if error.is_timeout() {
            StudioError::NetworkError(format!(
                "request to {} timed out after {}s",
                self.endpoint,
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            StudioError::network_error(&format!("connect to {}", self.endpoint), error)
        } else {
            StudioError::network_error("send matting request", error)
        }
    }
}

impl std::fmt::Debug for RemoteMattingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteMattingService")
            .field("endpoint", &self.endpoint)
            .field("configured", &self.is_configured())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackgroundRemovalProvider for RemoteMattingService {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn supports_transparency(&self) -> bool {
        true
    }

    fn remove_background(
        &self,
        image: &RgbImage,
        target: &BackgroundTarget,
    ) -> Result<RasterBuffer> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StudioError::provider_unavailable("no API key configured for the remote matting service")
        })?;

        let (width, height) = image.dimensions();
        let png = ImageCodec::encode_png_parts(image.as_raw(), width, height, ChannelMode::Color)?;
        log::debug!(
            "Sending {}x{} image ({} bytes) to {}",
            width,
            height,
            png.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .multipart(Self::build_form(png, target)?)
            .send()
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .map_err(|e| StudioError::network_error("read error response", e))?;
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            log::warn!("Matting service returned {}: {}", status.as_u16(), message);
            return Err(StudioError::provider_error(status.as_u16(), message));
        }

        let bytes = response
            .bytes()
            .map_err(|e| StudioError::network_error("read matting response", e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            StudioError::provider_error(
                status.as_u16(),
                format!("response is not a decodable image: {}", e),
            )
        })?;

        if (decoded.width(), decoded.height()) != (width, height) {
            log::warn!(
                "Matting service returned {}x{} for a {}x{} input",
                decoded.width(),
                decoded.height(),
                width,
                height
            );
        }

        Ok(match target {
            BackgroundTarget::Transparent => RasterBuffer::ColorAlpha(decoded.to_rgba8()),
            _ => RasterBuffer::Color(decoded.to_rgb8()),
        })
    }
}

/// Error payload returned by the matting service
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    title: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Human-readable message from an error body, raw text when it is not JSON
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorPayload>(trimmed) {
        Ok(payload) if !payload.errors.is_empty() => Some(
            payload
                .errors
                .iter()
                .map(|entry| {
                    let mut text = entry.title.clone();
                    if let Some(detail) = &entry.detail {
                        text = format!("{} ({})", text, detail);
                    }
                    if let Some(code) = &entry.code {
                        text = format!("{} [{}]", text, code);
                    }
                    text
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> RemoteMattingService {
        RemoteMattingService::new(None, "http://127.0.0.1:9/removebg", Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let service = unconfigured();
        assert!(!service.is_configured());
        let result = service.remove_background(&RgbImage::new(2, 2), &BackgroundTarget::Default);
        assert!(matches!(result, Err(StudioError::ProviderUnavailable(_))));
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let service = RemoteMattingService::new(
            Some("   ".to_string()),
            "http://127.0.0.1:9/removebg",
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!service.is_configured());
    }

    #[test]
    fn test_error_payload_parsing() {
        let body = r#"{"errors":[{"title":"Insufficient credits","code":"insufficient_credits"}]}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Insufficient credits [insufficient_credits]")
        );

        let body = r#"{"errors":[{"title":"File too large","detail":"max 12MB"},{"title":"Bad size"}]}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("File too large (max 12MB); Bad size")
        );
    }

    #[test]
    fn test_error_payload_fallbacks() {
        assert_eq!(error_message("Forbidden").as_deref(), Some("Forbidden"));
        assert_eq!(error_message("  \n").as_deref(), None);
        assert_eq!(error_message(r#"{"errors":[]}"#).as_deref(), Some(r#"{"errors":[]}"#));
    }

    #[test]
    fn test_debug_hides_key() {
        let service = RemoteMattingService::new(
            Some("top-secret".to_string()),
            "http://127.0.0.1:9/removebg",
            Duration::from_secs(1),
        )
        .unwrap();
        let debug = format!("{:?}", service);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("configured: true"));
    }
}
