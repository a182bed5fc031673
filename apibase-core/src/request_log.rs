//! Serializable request summary emitted by the pipeline.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::request::RequestDescriptor;

const REDACTED: &str = "***";

/// Headers whose values never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie"];

/// Snapshot of one outbound request for structured logging.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    /// Client instance identifier.
    pub client_id: String,
    /// Per-client sequence number.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Request headers with sensitive values redacted.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Body content type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Body rendered as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestLog {
    /// Captures `request` as issued by `client_id` with number `sequence`.
    pub fn new(client_id: &str, sequence: u64, request: &RequestDescriptor) -> Self {
        let headers = request
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if SENSITIVE_HEADERS
                    .iter()
                    .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
                {
                    REDACTED.to_string()
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect();

        Self {
            client_id: client_id.to_string(),
            sequence,
            method: request.method.to_string(),
            url: request.url.clone(),
            headers,
            content_type: request.body.content_type(),
            body: request.body.preview(),
        }
    }

    /// Indented JSON rendering.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("<unserializable request log: {e}>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ApiRequest;
    use std::collections::HashMap;

    #[test]
    fn test_skips_absent_fields() {
        let request = ApiRequest::get("/items").build("http://h", &HashMap::new());
        let log = RequestLog::new("abc123", 1, &request);
        let json = log.to_pretty_json();

        assert!(json.contains("\"clientId\": \"abc123\""));
        assert!(json.contains("\"sequence\": 1"));
        assert!(!json.contains("body"));
        assert!(!json.contains("headers"));
        assert!(!json.contains("contentType"));
    }

    #[test]
    fn test_redacts_credentials() {
        let request = ApiRequest::post("/login")
            .basic_auth("user", "secret")
            .header("X-Trace", "t-1")
            .text_body("{}", "application/json")
            .build("http://h", &HashMap::new());
        let log = RequestLog::new("abc123", 9, &request);

        assert_eq!(log.headers.get("Authorization").map(String::as_str), Some("***"));
        assert_eq!(log.headers.get("X-Trace").map(String::as_str), Some("t-1"));
        assert_eq!(log.body.as_deref(), Some("{}"));
        assert_eq!(log.content_type.as_deref(), Some("application/json; charset=utf-8"));
    }
}
