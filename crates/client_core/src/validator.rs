//! Acceptance checks applied to every file before it may enter the workflow.

use std::sync::Arc;

use shared::domain::MAX_UPLOAD_BYTES;
use thiserror::Error;

/// A file as handed over by a file source (picker or drop gesture).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub media_type: String,
    /// Declared size; validation trusts this rather than `bytes.len()`.
    pub size: u64,
    pub bytes: Arc<[u8]>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes: bytes.into(),
        }
    }
}

/// A file that passed validation. Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    media_type: String,
    size: u64,
    bytes: Arc<[u8]>,
}

impl CandidateFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// `"photo.png (2.10 MB)"`
    pub fn summary(&self) -> String {
        file_summary(&self.name, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{name}' has media type '{media_type}', which is not an image")]
    InvalidType { name: String, media_type: String },
    #[error("'{name}' is {size} bytes, above the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
}

pub fn validate(file: RawFile) -> Result<CandidateFile, ValidationError> {
    if !is_image_type(&file.media_type) {
        return Err(ValidationError::InvalidType {
            name: file.name,
            media_type: file.media_type,
        });
    }

    if file.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            name: file.name,
            size: file.size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(CandidateFile {
        name: file.name,
        media_type: file.media_type,
        size: file.size,
        bytes: file.bytes,
    })
}

fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

pub fn file_summary(name: &str, size: u64) -> String {
    let mebibytes = size as f64 / 1024.0 / 1024.0;
    format!("{name} ({mebibytes:.2} MB)")
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
