//! URL assembly: base-path joining, path templating and query encoding.

/// Returns `true` when `path` already carries an `http://` or `https://` scheme.
pub fn is_absolute_url(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Joins `path` onto `base_path`, unless `path` is already absolute.
///
/// A single `/` is kept when both sides carry one at the seam.
///
/// ```rust
/// use apibase_core::request::resolve_url;
///
/// assert_eq!(
///     resolve_url("https://api.example.com/", "/items/42"),
///     "https://api.example.com/items/42"
/// );
/// assert_eq!(
///     resolve_url("https://api.example.com", "https://other.example.com/x"),
///     "https://other.example.com/x"
/// );
/// ```
pub fn resolve_url(base_path: &str, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    match (base_path.ends_with('/'), path.strip_prefix('/')) {
        (true, Some(rest)) => format!("{base_path}{rest}"),
        _ => format!("{base_path}{path}"),
    }
}

/// Replaces every `{name}` placeholder with its value from `params`.
///
/// Values are inserted verbatim. Placeholders without a matching parameter are
/// left untouched, and substituted values are never rescanned. When a name
/// appears more than once in `params`, the last value wins.
///
/// ```rust
/// use apibase_core::request::substitute_path_params;
///
/// let url = substitute_path_params("/users/{user}/items/{id}", &[("id", "42")]);
/// assert_eq!(url, "/users/{user}/items/42");
/// ```
pub fn substitute_path_params<K, V>(template: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let lookup = |name: &str| {
        params
            .iter()
            .rev()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['}', '{']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // Unterminated, or a nested '{' restarts the scan.
            Some(next) => {
                out.push('{');
                out.push_str(&after[..next]);
                rest = &after[next..];
            }
            None => {
                out.push('{');
                rest = after;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Appends percent-encoded `key=value` pairs to `url`.
///
/// Uses `?` as separator, or `&` when `url` already has a query string. An
/// empty `query` returns `url` unchanged.
///
/// ```rust
/// use apibase_core::request::append_query;
///
/// assert_eq!(append_query("https://h/x", &[] as &[(&str, &str)]), "https://h/x");
/// assert_eq!(
///     append_query("https://h/x", &[("q", "a b&c"), ("n", "1")]),
///     "https://h/x?q=a%20b%26c&n=1"
/// );
/// ```
pub fn append_query<K, V>(url: &str, query: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if query.is_empty() {
        return url.to_string();
    }

    let encoded = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_variants() {
        assert_eq!(resolve_url("http://h/", "/a"), "http://h/a");
        assert_eq!(resolve_url("http://h", "/a"), "http://h/a");
        assert_eq!(resolve_url("http://h/", "a"), "http://h/a");
        assert_eq!(resolve_url("http://h/v1", "/a"), "http://h/v1/a");
        assert_eq!(resolve_url("http://h/", "HTTPS://x/y"), "HTTPS://x/y");
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("http://x"));
        assert!(is_absolute_url("https://x"));
        assert!(!is_absolute_url("/https://x"));
        assert!(!is_absolute_url("ftp://x"));
        assert!(!is_absolute_url(""));
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let out = substitute_path_params("/{id}/copy/{id}", &[("id", "7")]);
        assert_eq!(out, "/7/copy/7");
    }

    #[test]
    fn test_substitute_leaves_unknown_and_malformed() {
        let params = [("a", "1")];
        assert_eq!(substitute_path_params("/{b}/{a}", &params), "/{b}/1");
        assert_eq!(substitute_path_params("/{a", &params), "/{a");
        assert_eq!(substitute_path_params("/{x{a}", &params), "/{x1");
        assert_eq!(substitute_path_params("/}{a}", &params), "/}1");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let params = [("a", "{b}"), ("b", "2")];
        assert_eq!(substitute_path_params("/{a}", &params), "/{b}");
    }

    #[test]
    fn test_substitute_last_value_wins() {
        let params = [("id", "1"), ("id", "2")];
        assert_eq!(substitute_path_params("/{id}", &params), "/2");
    }

    #[test]
    fn test_append_query_existing_query_string() {
        assert_eq!(append_query("http://h/x?a=1", &[("b", "2")]), "http://h/x?a=1&b=2");
    }

    #[test]
    fn test_append_query_encodes_reserved_characters() {
        let out = append_query("http://h", &[("k/=", "v?#")]);
        assert_eq!(out, "http://h?k%2F%3D=v%3F%23");
    }
}
