use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

pub const UPSCALE_PATH: &str = "/upscale";
pub const HEALTH_PATH: &str = "/health";
pub const INFO_PATH: &str = "/info";

/// Multipart field carrying the image bytes.
pub const UPLOAD_FIELD: &str = "image";

pub const HEALTHY_STATUS: &str = "healthy";

/// Text used when the backend declares failure without saying why.
pub const DEFAULT_FAILURE_TEXT: &str = "processing failed";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpscaleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub upscaled_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpscaledImage {
    /// Embeddable image reference, usually a base64 data URL.
    pub image: String,
    pub processing_time: Option<f64>,
    pub original_size: Option<u64>,
    pub result_size: Option<u64>,
}

impl UpscaleResponse {
    pub fn into_result(self) -> Result<UpscaledImage, ProtocolError> {
        if !self.success {
            let message = self
                .error
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_TEXT.to_string());
            return Err(ProtocolError::Declared(message));
        }

        let image = self
            .upscaled_image
            .filter(|image| !image.is_empty())
            .ok_or(ProtocolError::MissingImage)?;

        Ok(UpscaledImage {
            image,
            processing_time: self.processing_time,
            original_size: self.original_size,
            result_size: self.result_size,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_token_configured: Option<bool>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY_STATUS
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        let timestamp = self.timestamp?;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return None;
        }
        let secs = timestamp.trunc() as i64;
        let nanos = (timestamp.fract() * 1_000_000_000.0) as u32;
        DateTime::from_timestamp(secs, nanos)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub model: Option<String>,
    pub max_file_size_mb: u64,
    #[serde(default)]
    pub supported_formats: Vec<String>,
}
