//! Payload codec: conversion between JSON values and wire text.

use serde_json::Value;
use std::fmt;

use crate::error::{DecodeError, Error, Result};
use crate::request::mime::JSON_MEDIA_TYPE;

/// Encodes request payloads and decodes response bodies.
pub trait PayloadCodec: Send + Sync + fmt::Debug {
    /// Renders `value` as wire text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the value cannot be rendered.
    fn encode(&self, value: &Value) -> Result<String>;

    /// Parses wire text. An empty or whitespace-only body decodes to
    /// [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on malformed input.
    fn decode(&self, text: &str) -> Result<Value>;

    /// Media type of the encoded form.
    fn media_type(&self) -> &str;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl PayloadCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.map_err(|e| Error::invalid_request(format!("JSON serialization failed: {e}")))
    }

    fn decode(&self, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(text).map_err(|e| Error::decode(DecodeError::Json(e)))
    }

    fn media_type(&self) -> &str {
        JSON_MEDIA_TYPE
    }
}
