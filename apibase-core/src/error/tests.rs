#![allow(clippy::disallowed_methods)] // unwrap() is acceptable in tests

use super::convert::{MAX_ERROR_MESSAGE_LEN, truncate_message};
use super::*;

#[test]
fn test_api_error_carries_status_and_body() {
    let body = r#"{"error":"not found"}"#.to_string();
    let err = Error::api(
        Some(404),
        "Error calling 'GET https://api.example.com/items/1'",
        Some(body.clone()),
    );

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.response_body(), Some(body.as_str()));
    assert!(err.to_string().contains("items/1"));
    assert!(err.to_string().contains("404"));
}

#[test]
fn test_api_error_details_display_without_status() {
    let details = ApiErrorDetails::new(None, "boom", None);
    assert_eq!(details.to_string(), "boom");
}

#[test]
fn test_kind_per_variant() {
    assert_eq!(Error::capacity("full").kind(), ErrorKind::Capacity);
    assert_eq!(Error::network("refused").kind(), ErrorKind::Transport);
    assert_eq!(Error::timeout("slow").kind(), ErrorKind::Transport);
    assert_eq!(Error::payload("ok=false").kind(), ErrorKind::Payload);
    assert_eq!(
        Error::initialization("no transport").kind(),
        ErrorKind::Initialization
    );
    assert_eq!(
        Error::from(ConfigValidationError::missing("base_path")).kind(),
        ErrorKind::Initialization
    );
    assert_eq!(
        Error::invalid_request("bad header").kind(),
        ErrorKind::InvalidRequest
    );

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert_eq!(Error::from(json_err).kind(), ErrorKind::Decode);
}

#[test]
fn test_kind_penetrates_context() {
    let err = Error::capacity("Throttle limit exceeded")
        .context("Layer 1")
        .context("Layer 2");
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(err.as_capacity(), Some("Throttle limit exceeded"));
}

#[test]
fn test_status_penetrates_context() {
    let err = Error::api(Some(503), "unavailable", Some("down".into())).context("fetch");
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.response_body(), Some("down"));
}

#[test]
fn test_network_request_failed_status() {
    let err = Error::from(NetworkError::RequestFailed {
        status: 502,
        message: "bad gateway".into(),
    });
    assert_eq!(err.status(), Some(502));
    assert!(err.response_body().is_none());
}

#[test]
fn test_decode_error_keeps_source() {
    let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = Error::decode(json_err);

    let source = StdError::source(&err).expect("decode error must expose its source");
    assert!(source.to_string().contains("JSON"));
    assert!(err.report().contains("Caused by"));
}

#[test]
fn test_context_chain_report() {
    let err = Error::network("Connection refused")
        .context("Layer 1")
        .context("Layer 2");

    let report = err.report();
    assert!(report.contains("Layer 2"));
    assert!(report.contains("Layer 1"));
    assert!(report.contains("Connection refused"));
    assert!(matches!(err.root_cause(), Error::Network(_)));
}

#[test]
fn test_context_ext_on_result_and_option() {
    let result: std::result::Result<(), NetworkError> = Err(NetworkError::Timeout);
    let err = result.context("sending request").unwrap_err();
    assert!(matches!(err, Error::Context { .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);

    let missing: Option<u8> = None;
    let err = missing.with_context(|| "value absent").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[test]
fn test_websocket_downcast() {
    let io = std::io::Error::other("socket closed");
    let err = Error::websocket_error(io).context("reading frame");
    assert!(err.downcast_websocket::<std::io::Error>().is_some());
    assert!(Error::websocket("x").downcast_websocket::<std::io::Error>().is_none());
}

#[test]
fn test_truncate_message() {
    let short = truncate_message("short".to_string());
    assert_eq!(short, "short");

    let long = truncate_message("é".repeat(MAX_ERROR_MESSAGE_LEN));
    assert!(long.ends_with("... (truncated)"));
    assert!(long.len() <= MAX_ERROR_MESSAGE_LEN + "... (truncated)".len());
}

#[test]
fn test_error_is_send_sync_static() {
    fn assert_traits<T: Send + Sync + 'static>() {}
    assert_traits::<Error>();
    assert_traits::<NetworkError>();
    assert_traits::<DecodeError>();
}

#[test]
fn test_error_size_stays_small() {
    assert!(std::mem::size_of::<Error>() <= 56);
}
