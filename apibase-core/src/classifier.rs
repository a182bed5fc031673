//! Error classification.
//!
//! The pipeline consults an [`ErrorClassifier`] twice per call: once on the
//! raw exchange ([`ErrorClassifier::classify_transport`]) and once on the
//! decoded payload ([`ErrorClassifier::classify_payload`]). Returning `Some`
//! aborts the call with that error.
//!
//! # Example
//!
//! ```rust
//! use apibase_core::classifier::{ErrorClassifier, SuccessFlagClassifier};
//! use serde_json::json;
//!
//! let classifier = SuccessFlagClassifier::default();
//! assert!(classifier.classify_payload(&json!({"ok": true})).is_none());
//!
//! let err = classifier
//!     .classify_payload(&json!({"ok": false, "error": "channel_not_found"}))
//!     .unwrap();
//! assert!(err.to_string().contains("channel_not_found"));
//! ```

use serde_json::Value;
use std::fmt;

use crate::error::{ApiErrorDetails, Error};
use crate::request::RequestDescriptor;
use crate::response::HttpResponse;

/// Decides whether an exchange or a decoded payload represents a failure.
pub trait ErrorClassifier: Send + Sync + fmt::Debug {
    /// Classifies a completed exchange. Defaults to [`classify_status`].
    fn classify_transport(
        &self,
        request: &RequestDescriptor,
        response: &HttpResponse,
    ) -> Option<Error> {
        classify_status(request, response)
    }

    /// Classifies a decoded payload. Defaults to no error.
    fn classify_payload(&self, _payload: &Value) -> Option<Error> {
        None
    }
}

/// Status-based classification.
///
/// Statuses `>= 400` and the sentinel `0` yield an [`Error::Api`] carrying the
/// status, a message naming the method and URL, and the raw body.
pub fn classify_status(request: &RequestDescriptor, response: &HttpResponse) -> Option<Error> {
    let status = response.status;
    if status != 0 && status < 400 {
        return None;
    }

    let message = if status == 0 {
        format!(
            "Error calling '{} {}': exchange did not complete",
            request.method, request.url
        )
    } else {
        format!("Error calling '{} {}'", request.method, request.url)
    };
    Some(Error::api(Some(status), message, Some(response.text())))
}

/// Status-based transport classification, no payload inspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ErrorClassifier for DefaultClassifier {}

/// Status-based transport classification plus a payload check closure.
pub struct PayloadClassifier<F> {
    check: F,
}

impl<F> PayloadClassifier<F>
where
    F: Fn(&Value) -> Option<Error> + Send + Sync,
{
    /// Wraps `check` as the payload classification.
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> fmt::Debug for PayloadClassifier<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadClassifier").finish_non_exhaustive()
    }
}

impl<F> ErrorClassifier for PayloadClassifier<F>
where
    F: Fn(&Value) -> Option<Error> + Send + Sync,
{
    fn classify_payload(&self, payload: &Value) -> Option<Error> {
        (self.check)(payload)
    }
}

/// Classifies `{"ok": false, "error": "..."}` envelopes as payload errors.
///
/// A payload is a failure only when it is an object whose flag field is the
/// boolean `false`. The message field, when it is a string, becomes the error
/// message; the whole payload is kept as the error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessFlagClassifier {
    flag_field: String,
    message_field: String,
}

impl SuccessFlagClassifier {
    /// Uses custom field names.
    pub fn new(flag_field: impl Into<String>, message_field: impl Into<String>) -> Self {
        Self {
            flag_field: flag_field.into(),
            message_field: message_field.into(),
        }
    }
}

impl Default for SuccessFlagClassifier {
    fn default() -> Self {
        Self::new("ok", "error")
    }
}

impl ErrorClassifier for SuccessFlagClassifier {
    fn classify_payload(&self, payload: &Value) -> Option<Error> {
        let object = payload.as_object()?;
        if object.get(&self.flag_field)? != &Value::Bool(false) {
            return None;
        }

        let message = object
            .get(&self.message_field)
            .and_then(Value::as_str)
            .map_or_else(
                || format!("Response reported '{}: false'", self.flag_field),
                str::to_string,
            );
        Some(Error::payload_with_details(ApiErrorDetails::new(
            None,
            message,
            Some(payload.to_string()),
        )))
    }
}
