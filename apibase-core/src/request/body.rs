use std::collections::BTreeMap;

/// Default media type of a text body.
pub const DEFAULT_TEXT_MEDIA_TYPE: &str = "text/plain";

/// Default text encoding label.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Media type used for form-encoded bodies.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// A string body with its media type and text encoding label.
///
/// Content is always transmitted as UTF-8 bytes; `charset` only labels it in
/// the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBody {
    /// Body text.
    pub content: String,
    /// Media type, e.g. `application/json`.
    pub media_type: String,
    /// Encoding label for the `charset` parameter.
    pub charset: String,
}

impl TextBody {
    /// Creates a `text/plain; charset=utf-8` body.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            media_type: DEFAULT_TEXT_MEDIA_TYPE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Sets the media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Sets the encoding label.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", self.media_type, self.charset)
    }
}

/// An opaque pre-built body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody {
    /// Body bytes, sent unchanged.
    pub bytes: Vec<u8>,
    /// Optional `Content-Type` header value.
    pub content_type: Option<String>,
}

/// Request body; exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// String content with media type and encoding label.
    Text(TextBody),
    /// Form-encoded fields.
    Form(BTreeMap<String, String>),
    /// Opaque content.
    Raw(RawBody),
}

impl RequestBody {
    /// Returns `true` for [`RequestBody::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// `Content-Type` implied by the body, if any.
    pub fn content_type(&self) -> Option<String> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Text(text) => Some(text.content_type()),
            RequestBody::Form(_) => Some(FORM_MEDIA_TYPE.to_string()),
            RequestBody::Raw(raw) => raw.content_type.clone(),
        }
    }

    /// Body rendered for logging. Raw bodies are summarized by length.
    pub fn preview(&self) -> Option<String> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Text(text) => Some(text.content.clone()),
            RequestBody::Form(fields) => Some(
                fields
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&"),
            ),
            RequestBody::Raw(raw) => Some(format!("<{} bytes>", raw.bytes.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_type() {
        let body = TextBody::new("{}").with_media_type("application/json");
        assert_eq!(body.content_type(), "application/json; charset=utf-8");

        let body = TextBody::new("hi").with_charset("iso-8859-1");
        assert_eq!(body.content_type(), "text/plain; charset=iso-8859-1");
    }

    #[test]
    fn test_body_content_type_and_preview() {
        assert!(RequestBody::Empty.content_type().is_none());
        assert!(RequestBody::default().is_empty());

        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), "1".to_string());
        fields.insert("b".to_string(), "2".to_string());
        let form = RequestBody::Form(fields);
        assert_eq!(form.content_type().as_deref(), Some(FORM_MEDIA_TYPE));
        assert_eq!(form.preview().as_deref(), Some("a=1&b=2"));

        let raw = RequestBody::Raw(RawBody {
            bytes: vec![0, 1, 2],
            content_type: None,
        });
        assert_eq!(raw.preview().as_deref(), Some("<3 bytes>"));
        assert!(raw.content_type().is_none());
    }
}
