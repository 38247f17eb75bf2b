use thiserror::Error;

/// Reasons a well-formed upscale response still cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{0}")]
    Declared(String),
    #[error("response reported success but carried no image")]
    MissingImage,
}
