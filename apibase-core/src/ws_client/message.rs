//! Messages delivered to WebSocket handlers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::{DecodeError, Error, Result};

/// A data frame received from the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Frame type name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Binary(_) => "Binary",
        }
    }

    /// Returns the text of a text frame.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Returns the raw bytes of either frame type.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Deserializes the frame as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the frame is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(self.as_bytes()).map_err(|e| Error::decode(DecodeError::Json(e)))
    }

    pub(crate) fn summary(&self) -> MessageSummary {
        MessageSummary {
            kind: self.kind(),
            text: String::from_utf8_lossy(self.as_bytes()).into_owned(),
            len: self.as_bytes().len(),
        }
    }
}

impl fmt::Display for WsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Log form of a received message.
#[derive(Debug, Serialize)]
pub(crate) struct MessageSummary {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
    len: usize,
}

impl MessageSummary {
    pub(crate) fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tick {
        price: f64,
    }

    #[test]
    fn test_json_decoding() {
        let message = WsMessage::Text(r#"{"price": 1.5}"#.to_string());
        assert_eq!(message.json::<Tick>().unwrap(), Tick { price: 1.5 });

        let binary = WsMessage::Binary(br#"{"price": 2.0}"#.to_vec());
        assert_eq!(binary.json::<Tick>().unwrap().price, 2.0);

        let bad = WsMessage::Text("nope".to_string());
        assert!(bad.json::<Tick>().is_err());
    }

    #[test]
    fn test_summary_json() {
        let message = WsMessage::Text("hi".to_string());
        let json: serde_json::Value = serde_json::from_str(&message.summary().to_json()).unwrap();
        assert_eq!(json["type"], "Text");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["len"], 2);
        assert_eq!(message.as_text(), Some("hi"));
        assert_eq!(WsMessage::Binary(vec![1, 2]).to_string(), "<2 bytes>");
    }
}
