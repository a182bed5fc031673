//! # Error Handling
//!
//! Every failure the request pipeline can produce is an [`Error`]. Variants are
//! grouped into the taxonomy exposed by [`ErrorKind`]:
//!
//! ```text
//! Error
//! ├── Capacity        - Throttle backlog exceeded (never retried)
//! ├── Api             - Exchange completed with status >= 400 (or status 0)
//! ├── Network         - Transport fault, the exchange never completed
//! ├── Timeout         - Per-call timeout elapsed during transmission
//! ├── Decode          - Malformed response body
//! ├── Payload         - Application-level failure inside a successful envelope
//! ├── Initialization  - Missing or unusable collaborator at construction
//! ├── Config          - Configuration rejected by validation
//! ├── InvalidRequest  - Request could not be assembled
//! ├── WebSocket       - Socket client failures
//! └── Context         - Error with additional context
//! ```
//!
//! No stage recovers from an error produced by a lower stage, and nothing in
//! this crate retries. Retry policy belongs to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use apibase_core::error::{Error, ErrorKind, Result};
//!
//! fn check(status: u16, body: &str) -> Result<()> {
//!     if status >= 400 {
//!         let message = "Error calling 'GET /items'";
//!         return Err(Error::api(Some(status), message, Some(body.to_string())));
//!     }
//!     Ok(())
//! }
//!
//! let err = check(404, r#"{"error":"not found"}"#).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Transport);
//! assert_eq!(err.status(), Some(404));
//! assert_eq!(err.response_body(), Some(r#"{"error":"not found"}"#));
//! ```
//!
//! ### Adding Context to Errors
//!
//! ```rust
//! use apibase_core::error::{Error, Result, ContextExt};
//!
//! fn load(id: &str) -> Result<()> {
//!     fetch(id).with_context(|| format!("Failed to load item {id}"))?;
//!     Ok(())
//! }
//! # fn fetch(_: &str) -> Result<()> { Ok(()) }
//! ```

mod api;
mod config;
mod context;
mod convert;
mod decode;
mod network;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

pub use api::ApiErrorDetails;
pub use config::{ConfigValidationError, ValidationResult};
pub use context::ContextExt;
pub use decode::DecodeError;
pub use network::NetworkError;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], penetrating context layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Throttle backlog exceeded. The caller should back off.
    Capacity,
    /// Status-classified failure, transport fault or timeout.
    Transport,
    /// Response body could not be decoded.
    Decode,
    /// Application-level failure embedded in the response payload.
    Payload,
    /// Construction-time failure (missing collaborator, invalid config).
    Initialization,
    /// The request could not be assembled or sent as given.
    InvalidRequest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Capacity => "capacity",
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Payload => "payload",
            ErrorKind::Initialization => "initialization",
            ErrorKind::InvalidRequest => "invalid_request",
        };
        f.write_str(name)
    }
}

/// The primary error type of the crate.
///
/// Large variants are boxed to keep the enum small; messages use
/// `Cow<'static, str>` so static strings do not allocate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The throttle gate refused admission because its backlog is full.
    #[error("Capacity exceeded: {0}")]
    Capacity(Cow<'static, str>),

    /// A completed exchange classified as failed (status >= 400 or 0).
    #[error("API error: {0}")]
    Api(Box<ApiErrorDetails>),

    /// Transport-level fault: the exchange could not be completed.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// Transmission did not finish within the per-call timeout.
    #[error("Timeout: {0}")]
    Timeout(Cow<'static, str>),

    /// The response body could not be decoded into the requested type.
    #[error("Failed to deserialize API response: {0}")]
    Decode(#[source] Box<DecodeError>),

    /// The payload classifier found an application-level failure.
    #[error("Payload error: {0}")]
    Payload(Box<ApiErrorDetails>),

    /// A required collaborator was missing or could not be created.
    #[error("Initialization error: {0}")]
    Initialization(Cow<'static, str>),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(#[source] Box<ConfigValidationError>),

    /// The request could not be assembled or handed to the transport.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// WebSocket communication errors.
    /// Keeps the original error for downcasting.
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    // ==================== Constructor Methods ====================

    /// Creates a capacity error (throttle backlog exceeded).
    pub fn capacity(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Capacity(msg.into())
    }

    /// Creates a status-classified API error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apibase_core::error::Error;
    ///
    /// let err = Error::api(Some(500), "Error calling 'GET /status'", None);
    /// assert_eq!(err.status(), Some(500));
    /// ```
    pub fn api(
        status: Option<u16>,
        message: impl Into<String>,
        response_body: Option<String>,
    ) -> Self {
        Self::Api(Box::new(ApiErrorDetails::new(status, message, response_body)))
    }

    /// Creates a payload error without status or body.
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload(Box::new(ApiErrorDetails::new(None, message, None)))
    }

    /// Creates a payload error from full details.
    pub fn payload_with_details(details: ApiErrorDetails) -> Self {
        Self::Payload(Box::new(details))
    }

    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a decode error.
    pub fn decode(err: impl Into<DecodeError>) -> Self {
        Self::Decode(Box::new(err.into()))
    }

    /// Creates an initialization error.
    pub fn initialization(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a WebSocket error from a message string.
    pub fn websocket(msg: impl Into<String>) -> Self {
        Self::WebSocket(Box::new(SimpleError(msg.into())))
    }

    /// Creates a WebSocket error from any error type.
    pub fn websocket_error<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::WebSocket(Box::new(err))
    }

    // ==================== Context Methods ====================

    /// Attaches context to an existing error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apibase_core::error::Error;
    ///
    /// let err = Error::network("Connection refused").context("Failed to fetch /items");
    /// assert!(err.report().contains("Connection refused"));
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    // ==================== Chain Traversal Methods ====================

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Generates a detailed error report with the full chain.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        report.push_str(&self.to_string());

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    // ==================== Helper Methods (Context Penetrating) ====================

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Error::Capacity(_) => ErrorKind::Capacity,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Payload(_) => ErrorKind::Payload,
            Error::Initialization(_) | Error::Config(_) => ErrorKind::Initialization,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            // Context is unreachable after root_cause().
            Error::Api(_)
            | Error::Network(_)
            | Error::Timeout(_)
            | Error::WebSocket(_)
            | Error::Context { .. } => ErrorKind::Transport,
        }
    }

    /// Returns the API error details carried by `Api` or `Payload` variants.
    #[must_use]
    pub fn details(&self) -> Option<&ApiErrorDetails> {
        match self.root_cause() {
            Error::Api(details) | Error::Payload(details) => Some(details.as_ref()),
            _ => None,
        }
    }

    /// HTTP status code attached to the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            Error::Network(ne) => ne.status(),
            _ => self.details().and_then(|d| d.status),
        }
    }

    /// Raw response body attached to the error, if any.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        self.details().and_then(|d| d.response_body.as_deref())
    }

    /// Checks if this is a capacity error. Returns the message.
    #[must_use]
    pub fn as_capacity(&self) -> Option<&str> {
        match self.root_cause() {
            Error::Capacity(msg) => Some(msg.as_ref()),
            _ => None,
        }
    }

    /// Attempts to downcast the WebSocket error to a specific type.
    #[must_use]
    pub fn downcast_websocket<T: StdError + 'static>(&self) -> Option<&T> {
        match self.root_cause() {
            Error::WebSocket(e) => e.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// A simple error type for wrapping string messages.
#[derive(Debug)]
struct SimpleError(String);

impl fmt::Display for SimpleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for SimpleError {}

#[cfg(test)]
mod tests;
