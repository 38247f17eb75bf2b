//! Data URL helpers and best-effort image dimension discovery.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageReader;
use shared::domain::ImageDimensions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("image reference is not a base64 data url")]
    NotDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unrecognized image data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read image header: {0}")]
    Image(#[from] image::ImageError),
}

pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Decodes `data:<type>;base64,<payload>`.
pub fn decode_data_url(reference: &str) -> Result<Vec<u8>, ProbeError> {
    let rest = reference
        .strip_prefix("data:")
        .ok_or(ProbeError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ProbeError::NotDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(ProbeError::NotDataUrl);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Reads only the image header; no pixel data is decoded.
pub fn probe_dimensions(bytes: &[u8]) -> Result<ImageDimensions, ProbeError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ImageDimensions { width, height })
}
