//! Request assembly.
//!
//! [`ApiRequest`] is the caller-facing builder; [`RequestDescriptor`] is the
//! fully resolved form handed to interceptors and to the transport.

mod body;
mod builder;
mod method;
pub mod mime;
mod url;

use std::collections::HashMap;

pub(crate) use builder::insert_header;

pub use body::{
    DEFAULT_CHARSET, DEFAULT_TEXT_MEDIA_TYPE, FORM_MEDIA_TYPE, RawBody, RequestBody, TextBody,
};
pub use builder::ApiRequest;
pub use method::HttpMethod;
pub use mime::{is_json_mime, select_header_accept, select_header_content_type};
pub use url::{append_query, is_absolute_url, resolve_url, substitute_path_params};

/// A transport-ready request: absolute URL, method, headers and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Absolute URL including the encoded query string.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Header map; names are unique ignoring case.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any header of the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.headers, name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_ignoring_case() {
        let mut descriptor = ApiRequest::get("/x")
            .header("X-Trace", "1")
            .build("http://h", &HashMap::new());
        descriptor.set_header("x-trace", "2");

        assert_eq!(descriptor.headers.len(), 1);
        assert_eq!(descriptor.header("X-TRACE"), Some("2"));
        assert_eq!(descriptor.header("missing"), None);
    }
}
