//! Response envelopes.
//!
//! [`HttpResponse`] is the raw exchange result produced by a transport;
//! [`ApiResponse`] is the decoded, immutable envelope returned to callers.

use std::collections::BTreeMap;

/// Number of body bytes shown in log previews.
pub const BODY_PREVIEW_SIZE: usize = 200;

/// Header multimap: lower-cased name to values in arrival order.
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

/// Raw result of one HTTP exchange.
///
/// A status of `0` means the exchange could not be completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, duplicates preserved.
    pub headers: HeaderMultiMap,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMultiMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header value, keeping earlier values of the same name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append_header(name, value);
        self
    }

    /// Appends a header value, keeping earlier values of the same name.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value of a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// All values of a header in arrival order, ignoring case.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` for statuses in `[200, 400)`.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Leading part of the body for log output.
    pub fn body_preview(&self) -> String {
        let end = self.body.len().min(BODY_PREVIEW_SIZE);
        String::from_utf8_lossy(&self.body[..end]).into_owned()
    }
}

/// Decoded response: status, headers and typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    status: u16,
    headers: HeaderMultiMap,
    data: T,
}

impl<T> ApiResponse<T> {
    /// Creates an envelope.
    pub fn new(status: u16, headers: HeaderMultiMap, data: T) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMultiMap {
        &self.headers
    }

    /// First value of a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Decoded payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the envelope and returns the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_multimap_preserves_duplicates() {
        let response = HttpResponse::new(200, "ok")
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2")
            .with_header("Content-Type", "text/plain");

        assert_eq!(response.header_values("SET-COOKIE"), ["a=1", "b=2"]);
        assert_eq!(response.header("set-cookie"), Some("a=1"));
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert!(response.header_values("missing").is_empty());
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(304, "").is_success());
        assert!(!HttpResponse::new(400, "").is_success());
        assert!(!HttpResponse::new(0, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
    }

    #[test]
    fn test_body_preview_truncates() {
        let response = HttpResponse::new(200, "x".repeat(BODY_PREVIEW_SIZE * 2));
        assert_eq!(response.body_preview().len(), BODY_PREVIEW_SIZE);
        assert_eq!(response.text().len(), BODY_PREVIEW_SIZE * 2);
    }

    #[test]
    fn test_api_response_accessors() {
        let mut headers = HeaderMultiMap::new();
        headers.insert("x-request-id".into(), vec!["abc".into()]);
        let response = ApiResponse::new(201, headers, vec![1, 2]);

        assert_eq!(response.status(), 201);
        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert_eq!(response.data(), &vec![1, 2]);
        assert_eq!(response.into_data(), vec![1, 2]);
    }
}
