//! Details carried by status-classified and payload errors.

use std::fmt;

/// Details of a failed API exchange.
///
/// Constructed once by a classifier and never mutated afterwards.
///
/// # Example
///
/// ```rust
/// use apibase_core::error::ApiErrorDetails;
///
/// let details = ApiErrorDetails::new(Some(404), "Error calling 'GET /items/1'", None);
/// assert_eq!(details.status, Some(404));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ApiErrorDetails {
    /// HTTP status code, when the failure came from a completed exchange.
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
    /// Raw response body for debugging.
    pub response_body: Option<String>,
}

impl ApiErrorDetails {
    /// Creates new details.
    pub fn new(
        status: Option<u16>,
        message: impl Into<String>,
        response_body: Option<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            response_body,
        }
    }
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}
