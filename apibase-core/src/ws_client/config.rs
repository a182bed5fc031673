//! WebSocket client configuration.

use std::time::Duration;

use crate::error::{ConfigValidationError, ValidationResult};
use crate::logging::LogLevel;

/// Default wait before reconnecting after an unexpected drop.
pub const DEFAULT_ERROR_RECONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for a [`WsApiClient`](super::WsApiClient).
#[derive(Debug, Clone)]
pub struct WsApiConfig {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Initial verbosity threshold for message logging.
    pub log_level: LogLevel,
    /// Wait before reconnecting after the socket drops unexpectedly.
    pub error_reconnect_timeout: Duration,
    /// Handshake timeout for each connection attempt.
    pub connect_timeout: Duration,
    /// Reconnect automatically after unexpected drops.
    pub auto_reconnect: bool,
}

impl WsApiConfig {
    /// Creates a config for `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the reconnect wait.
    #[must_use]
    pub fn with_error_reconnect_timeout(mut self, timeout: Duration) -> Self {
        self.error_reconnect_timeout = timeout;
        self
    }

    /// Sets the verbosity threshold.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or not a WebSocket URL, or the
    /// connect timeout is zero.
    pub fn validate(&self) -> Result<ValidationResult, ConfigValidationError> {
        if self.url.is_empty() {
            return Err(ConfigValidationError::missing("url"));
        }
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigValidationError::invalid(
                "url",
                "must start with ws:// or wss://",
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigValidationError::too_low("connect_timeout", "0ms", "1ms"));
        }

        let mut result = ValidationResult::new();
        if self.auto_reconnect && self.error_reconnect_timeout.is_zero() {
            result.add_warning(
                "error_reconnect_timeout is zero; reconnects will spin on a dead endpoint",
            );
        }
        Ok(result)
    }
}

impl Default for WsApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            log_level: LogLevel::default(),
            error_reconnect_timeout: DEFAULT_ERROR_RECONNECT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            auto_reconnect: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WsApiConfig::new("wss://stream.example.com/ws");
        assert_eq!(config.error_reconnect_timeout, Duration::from_millis(5000));
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.auto_reconnect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_ws_urls() {
        assert!(WsApiConfig::default().validate().is_err());
        assert!(WsApiConfig::new("https://example.com").validate().is_err());
    }

    #[test]
    fn test_zero_reconnect_warns() {
        let result = WsApiConfig::new("ws://localhost:1")
            .with_error_reconnect_timeout(Duration::ZERO)
            .validate()
            .unwrap();
        assert!(!result.warnings.is_empty());
    }
}
