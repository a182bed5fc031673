//! Network-related error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Transport faults, without exposing the HTTP library in the public API.
///
/// # Example
///
/// ```rust
/// use apibase_core::error::NetworkError;
///
/// fn describe(err: &NetworkError) -> String {
///     match err {
///         NetworkError::Timeout => "timed out".to_string(),
///         NetworkError::ConnectionFailed(msg) => format!("connection failed: {msg}"),
///         other => other.to_string(),
///     }
/// }
/// assert_eq!(describe(&NetworkError::Timeout), "timed out");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Request failed with HTTP status code before a response was produced.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Request timed out inside the transport.
    #[error("Request timeout")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body exceeded the configured size limit.
    #[error("Response size {size} bytes exceeds limit {limit} bytes")]
    ResponseTooLarge {
        /// Observed size so far
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Opaque transport error preserving the source.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl NetworkError {
    /// Status code carried by the fault, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
