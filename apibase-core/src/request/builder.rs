use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::body::{RawBody, RequestBody, TextBody};
use super::mime::JSON_MEDIA_TYPE;
use super::url::{append_query, resolve_url, substitute_path_params};
use super::{HttpMethod, RequestDescriptor};
use crate::error::{Error, Result};

/// Fluent description of one API operation call.
///
/// Collects a path template with its parameters, query parameters, headers
/// and body candidates; [`ApiRequest::build`] turns it into a
/// [`RequestDescriptor`]. Several body kinds may be supplied, in which case
/// form fields win over a text body, which wins over a raw body.
///
/// # Example
///
/// ```rust
/// use apibase_core::request::{ApiRequest, HttpMethod};
/// use std::collections::HashMap;
///
/// let descriptor = ApiRequest::get("/items/{id}")
///     .path_param("id", 42)
///     .query_param("expand", "owner")
///     .header("Accept", "application/json")
///     .build("https://api.example.com/", &HashMap::new());
///
/// assert_eq!(descriptor.method, HttpMethod::Get);
/// assert_eq!(descriptor.url, "https://api.example.com/items/42?expand=owner");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HashMap<String, String>,
    form: BTreeMap<String, String>,
    text: Option<TextBody>,
    raw: Option<RawBody>,
}

impl ApiRequest {
    /// Creates a request for `path`, relative to the client base path or absolute.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// HEAD request.
    pub fn head(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, path)
    }

    /// OPTIONS request.
    pub fn options(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Options, path)
    }

    /// Method of this request.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Unresolved path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sets the value substituted for `{name}` in the path.
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        self.path_params.retain(|(existing, _)| *existing != name);
        self.path_params.push((name, value.to_string()));
        self
    }

    /// Appends a query parameter. Repeated keys are kept in order.
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a header, replacing any header of the same name (case-insensitive).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Sets a form field.
    pub fn form_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.form.insert(name.into(), value.to_string());
        self
    }

    /// Sets a text body with the given media type and a UTF-8 label.
    pub fn text_body(mut self, content: impl Into<String>, media_type: impl Into<String>) -> Self {
        self.text = Some(TextBody::new(content).with_media_type(media_type));
        self
    }

    /// Sets a fully specified text body.
    pub fn text(mut self, body: TextBody) -> Self {
        self.text = Some(body);
        self
    }

    /// Serializes `body` to compact JSON and sets it as the text body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `body` cannot be serialized.
    pub fn json_body<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let content = serde_json::to_string(body)
            .map_err(|e| Error::invalid_request(format!("JSON serialization failed: {e}")))?;
        Ok(self.text_body(content, JSON_MEDIA_TYPE))
    }

    /// Sets an opaque body sent unchanged.
    pub fn raw_body(mut self, bytes: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        self.raw = Some(RawBody {
            bytes: bytes.into(),
            content_type,
        });
        self
    }

    /// Sets an `Authorization: Basic` header.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{username}:{password}"));
        self.header("Authorization", format!("Basic {token}"))
    }

    /// Builds the transport-level descriptor.
    ///
    /// Path parameters are substituted, the path is resolved against
    /// `base_path`, query parameters are encoded and appended, and request
    /// headers override `default_headers` of the same name.
    pub fn build(
        self,
        base_path: &str,
        default_headers: &HashMap<String, String>,
    ) -> RequestDescriptor {
        let path = substitute_path_params(&self.path, &self.path_params);
        let url = append_query(&resolve_url(base_path, &path), &self.query);

        let mut headers = HashMap::with_capacity(default_headers.len() + self.headers.len());
        for (name, value) in default_headers.iter().chain(self.headers.iter()) {
            insert_header(&mut headers, name.clone(), value.clone());
        }

        let body = if !self.form.is_empty() {
            RequestBody::Form(self.form)
        } else if let Some(text) = self.text {
            RequestBody::Text(text)
        } else if let Some(raw) = self.raw {
            RequestBody::Raw(raw)
        } else {
            RequestBody::Empty
        };

        RequestDescriptor {
            url,
            method: self.method,
            headers,
            body,
        }
    }
}

pub(crate) fn insert_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}
