//! Parameter flattening for query strings, path segments and form fields.
//!
//! # Example
//!
//! ```rust
//! use apibase_core::params::{parameter_to_pairs, parameter_to_string, CollectionFormat};
//! use serde_json::json;
//!
//! assert_eq!(parameter_to_string(&json!(["a", 1, true])), "a,1,true");
//! assert_eq!(
//!     parameter_to_pairs("id", &json!([1, 2]), CollectionFormat::Multi),
//!     vec![("id".to_string(), "1".to_string()), ("id".to_string(), "2".to_string())]
//! );
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// How array values are rendered as parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFormat {
    /// One pair with comma-separated values.
    #[default]
    Csv,
    /// One pair per element, repeating the name.
    Multi,
}

/// Renders a JSON value as a parameter string.
///
/// `null` becomes `"null"`, strings are used verbatim, arrays are joined with
/// commas, and other values use their JSON text without surrounding quotes.
pub fn parameter_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(parameter_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => remove_json_string_brackets(&other.to_string()).to_string(),
    }
}

/// Strips one pair of surrounding double quotes, if present.
pub fn remove_json_string_brackets(json: &str) -> &str {
    if json.len() >= 2 && json.starts_with('"') && json.ends_with('"') {
        &json[1..json.len() - 1]
    } else {
        json
    }
}

/// Flattens a serializable struct or map into `name -> string` pairs.
///
/// `None`/`null` fields are omitted.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if `params` does not serialize to an
/// object.
pub fn parameters_to_map<T: Serialize + ?Sized>(params: &T) -> Result<BTreeMap<String, String>> {
    let value = serde_json::to_value(params)
        .map_err(|e| Error::invalid_request(format!("Failed to serialize parameters: {e}")))?;

    match value {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name, parameter_to_string(&value)))
            .collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => Err(Error::invalid_request(format!(
            "Parameters must serialize to an object, got {other}"
        ))),
    }
}

/// Renders one named parameter as key/value pairs.
///
/// Arrays under [`CollectionFormat::Multi`] produce one pair per element;
/// everything else produces a single pair.
pub fn parameter_to_pairs(
    name: &str,
    value: &Value,
    format: CollectionFormat,
) -> Vec<(String, String)> {
    match (value, format) {
        (Value::Array(items), CollectionFormat::Multi) => items
            .iter()
            .map(|item| (name.to_string(), parameter_to_string(item)))
            .collect(),
        _ => vec![(name.to_string(), parameter_to_string(value))],
    }
}

/// Inserts `value` under `key` only when it is present.
pub fn add_optional<K, V>(params: &mut BTreeMap<K, V>, key: K, value: Option<V>)
where
    K: Ord,
{
    if let Some(value) = value {
        params.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Query {
        symbol: &'static str,
        limit: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<i64>,
        side: Option<&'static str>,
        ids: Vec<u8>,
    }

    #[test]
    fn test_parameter_to_string_scalars() {
        assert_eq!(parameter_to_string(&Value::Null), "null");
        assert_eq!(parameter_to_string(&json!("a \"b\"")), "a \"b\"");
        assert_eq!(parameter_to_string(&json!(42)), "42");
        assert_eq!(parameter_to_string(&json!(1.5)), "1.5");
        assert_eq!(parameter_to_string(&json!(false)), "false");
    }

    #[test]
    fn test_parameter_to_string_nested() {
        assert_eq!(parameter_to_string(&json!([1, "x", null])), "1,x,null");
        assert_eq!(parameter_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_remove_json_string_brackets() {
        assert_eq!(remove_json_string_brackets("\"abc\""), "abc");
        assert_eq!(remove_json_string_brackets("\""), "\"");
        assert_eq!(remove_json_string_brackets("abc"), "abc");
        assert_eq!(remove_json_string_brackets("\"\""), "");
    }

    #[test]
    fn test_parameters_to_map() {
        let query = Query {
            symbol: "BTC",
            limit: 10,
            from: None,
            side: None,
            ids: vec![1, 2],
        };
        let map = parameters_to_map(&query).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map["symbol"], "BTC");
        assert_eq!(map["limit"], "10");
        assert_eq!(map["ids"], "1,2");
        assert!(!map.contains_key("side"));
    }

    #[test]
    fn test_parameters_to_map_rejects_scalars() {
        assert!(parameters_to_map(&5).is_err());
        assert!(parameters_to_map(&()).unwrap().is_empty());
    }

    #[test]
    fn test_parameter_to_pairs_formats() {
        let values = json!(["a", "b"]);
        assert_eq!(
            parameter_to_pairs("tag", &values, CollectionFormat::Csv),
            vec![("tag".to_string(), "a,b".to_string())]
        );
        assert_eq!(parameter_to_pairs("tag", &values, CollectionFormat::Multi).len(), 2);
        assert_eq!(
            parameter_to_pairs("n", &json!(3), CollectionFormat::Multi),
            vec![("n".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn test_add_optional() {
        let mut params = BTreeMap::new();
        add_optional(&mut params, "a", Some("1"));
        add_optional(&mut params, "b", None);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some(&"1"));
    }
}
