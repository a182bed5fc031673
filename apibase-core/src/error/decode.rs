//! Response decoding errors.

use std::borrow::Cow;
use thiserror::Error;

/// Errors raised while turning a response body into a typed payload.
///
/// Always surfaced wrapped in [`Error::Decode`](super::Error::Decode), which
/// keeps the original parse failure as its source.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The body is not valid JSON, or does not match the requested type.
    #[error("Failed to deserialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is not valid UTF-8.
    #[error("Response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A codec rejected the body for another reason.
    #[error("Invalid format: {0}")]
    InvalidFormat(Cow<'static, str>),
}

impl DecodeError {
    /// Creates an `InvalidFormat` error.
    pub fn invalid_format(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidFormat(message.into())
    }
}
