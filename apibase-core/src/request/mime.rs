//! Content negotiation helpers for generated operations.

/// Fallback content type when an operation declares none.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Returns `true` for `application/json` and any `*/*+json` type.
///
/// Matching ignores case and media-type parameters.
pub fn is_json_mime(mime: &str) -> bool {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == JSON_MEDIA_TYPE {
        return true;
    }
    match essence.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty() && subtype.len() > "+json".len() && subtype.ends_with("+json")
        }
        None => false,
    }
}

/// Picks the request `Content-Type` from the types an operation accepts.
///
/// The first JSON type wins; otherwise the first listed type; with an empty
/// list, `application/json`.
pub fn select_header_content_type<S: AsRef<str>>(content_types: &[S]) -> String {
    content_types
        .iter()
        .map(AsRef::as_ref)
        .find(|ct| is_json_mime(ct))
        .or_else(|| content_types.first().map(AsRef::as_ref))
        .unwrap_or(JSON_MEDIA_TYPE)
        .to_string()
}

/// Picks the `Accept` header value from the types an operation produces.
///
/// Returns the first JSON type if one exists, otherwise every type joined by
/// commas. `None` for an empty list.
pub fn select_header_accept<S: AsRef<str>>(accepts: &[S]) -> Option<String> {
    if accepts.is_empty() {
        return None;
    }
    if let Some(json) = accepts.iter().map(AsRef::as_ref).find(|a| is_json_mime(a)) {
        return Some(json.to_string());
    }
    Some(
        accepts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(","),
    )
}
