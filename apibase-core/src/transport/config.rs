use crate::error::{ConfigValidationError, ValidationResult};
use std::time::Duration;

/// Default user agent sent by [`ReqwestTransport`](super::ReqwestTransport).
pub const DEFAULT_USER_AGENT: &str = concat!("apibase/", env!("CARGO_PKG_VERSION"));

/// Outbound proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://127.0.0.1:8080`.
    pub url: String,
    /// Optional username for authentication.
    pub username: Option<String>,
    /// Optional password for authentication.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy without credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Sets proxy credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Settings of the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-exchange timeout enforced by the HTTP client.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Optional proxy.
    pub proxy: Option<ProxyConfig>,
    /// Maximum idle keep-alive connections per host.
    pub pool_max_idle_per_host: usize,
    /// Idle connection lifetime.
    pub pool_idle_timeout: Duration,
    /// Maximum response body size in bytes. Larger bodies fail the exchange.
    pub max_response_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(100),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            max_response_size: 10 * 1024 * 1024,
        }
    }
}

impl TransportConfig {
    /// Validates the transport settings.
    ///
    /// - `request_timeout` above 10 minutes is rejected
    /// - `max_response_size` of zero is rejected
    /// - `request_timeout` under one second produces a warning
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        let mut result = ValidationResult::new();

        if self.request_timeout > Duration::from_secs(600) {
            return Err(ConfigValidationError::too_high(
                "request_timeout",
                format!("{:?}", self.request_timeout),
                "10 minutes",
            ));
        }
        if self.max_response_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_response_size",
                "max_response_size cannot be zero",
            ));
        }
        if self.request_timeout < Duration::from_secs(1) {
            result.add_warning(format!(
                "request_timeout {:?} is very short, may cause frequent timeouts",
                self.request_timeout
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let result = TransportConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
        assert!(DEFAULT_USER_AGENT.starts_with("apibase/"));
    }

    #[test]
    fn test_validate_rules() {
        let config = TransportConfig {
            request_timeout: Duration::from_secs(3600),
            ..TransportConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field_name(), "request_timeout");

        let config = TransportConfig {
            max_response_size: 0,
            ..TransportConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field_name(), "max_response_size");

        let config = TransportConfig {
            request_timeout: Duration::from_millis(200),
            ..TransportConfig::default()
        };
        assert!(config.validate().unwrap().has_warnings());
    }

    #[test]
    fn test_proxy_credentials() {
        let proxy = ProxyConfig::new("http://127.0.0.1:8080").with_credentials("u", "p");
        assert_eq!(proxy.username.as_deref(), Some("u"));
        assert_eq!(proxy.password.as_deref(), Some("p"));
    }
}
