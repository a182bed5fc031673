//! Structured logging system.
//!
//! Two layers cooperate:
//! - the process-wide `tracing` subscriber installed by [`init_logging`] or
//!   [`try_init_logging`] (overridable through `RUST_LOG`);
//! - the per-client verbosity threshold ([`LogLevel`]) that each API client
//!   reads at call time before emitting request and response summaries.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// Trace level: most detailed debugging information.
    Trace,
    /// Debug level: detailed debugging information.
    Debug,
    /// Info level: request and response summaries.
    #[default]
    Info,
    /// Warn level: potential issues.
    Warn,
    /// Error level: classified failures.
    Error,
    /// Nothing is emitted.
    Off,
}

impl LogLevel {
    /// Returns `true` when an event at `level` passes this threshold.
    ///
    /// ```rust
    /// use apibase_core::logging::LogLevel;
    ///
    /// assert!(LogLevel::Info.allows(LogLevel::Error));
    /// assert!(!LogLevel::Warn.allows(LogLevel::Info));
    /// assert!(!LogLevel::Off.allows(LogLevel::Error));
    /// ```
    pub fn allows(self, level: LogLevel) -> bool {
        level != LogLevel::Off && self != LogLevel::Off && level >= self
    }
}

impl From<LogLevel> for Option<Level> {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Some(Level::TRACE),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Off => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable formatted output.
    Pretty,
    /// Compact format.
    Compact,
    /// JSON format for production environments.
    Json,
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
    /// Whether to show timestamps.
    pub show_time: bool,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
    /// Whether to show target module.
    pub show_target: bool,
    /// Whether to show span events (enter/close).
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_time: true,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Configuration for production environments.
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_time: false,
            show_thread_ids: false,
            show_target: false,
            show_span_events: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "apibase={},apibase_core={}",
                self.level, self.level
            ))
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.show_span_events {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_thread_ids(self.show_thread_ids)
            .with_target(self.show_target)
            .with_span_events(self.span_events());

        // Timer type differs per branch, so each arm boxes its own layer.
        match (self.format, self.show_time) {
            (LogFormat::Pretty, true) => base.pretty().boxed(),
            (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (LogFormat::Compact, true) => base.compact().boxed(),
            (LogFormat::Compact, false) => base.compact().without_time().boxed(),
            (LogFormat::Json, true) => base.json().boxed(),
            (LogFormat::Json, false) => base.json().without_time().boxed(),
        }
    }

    fn try_install(&self) -> Result<(), TryInitError> {
        tracing_subscriber::registry()
            .with(self.fmt_layer().with_filter(self.env_filter()))
            .try_init()
    }
}

/// Installs the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] where repeated initialization is expected.
///
/// ```no_run
/// use apibase_core::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::development());
/// ```
pub fn init_logging(config: &LogConfig) {
    if let Err(e) = config.try_install() {
        panic!("Failed to install tracing subscriber: {e}");
    }
}

/// Installs the global subscriber, ignoring duplicate initialization.
pub fn try_init_logging(config: &LogConfig) {
    let _ = config.try_install();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Off);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_threshold_allows() {
        assert!(LogLevel::Trace.allows(LogLevel::Info));
        assert!(LogLevel::Info.allows(LogLevel::Info));
        assert!(LogLevel::Error.allows(LogLevel::Error));
        assert!(!LogLevel::Error.allows(LogLevel::Warn));
        assert!(!LogLevel::Off.allows(LogLevel::Error));
        assert!(!LogLevel::Trace.allows(LogLevel::Off));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Option::<Level>::from(LogLevel::Trace), Some(Level::TRACE));
        assert_eq!(Option::<Level>::from(LogLevel::Error), Some(Level::ERROR));
        assert_eq!(Option::<Level>::from(LogLevel::Off), None);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Off.to_string(), "off");
    }

    #[test]
    fn test_presets() {
        let dev = LogConfig::development();
        assert_eq!(dev.level, LogLevel::Debug);
        assert!(dev.show_span_events);

        let prod = LogConfig::production();
        assert_eq!(prod.format, LogFormat::Json);
        assert!(prod.show_thread_ids);

        let test = LogConfig::test();
        assert_eq!(test.format, LogFormat::Compact);
        assert!(!test.show_time);
    }

    #[test]
    fn test_try_init_logging_is_idempotent() {
        try_init_logging(&LogConfig::test());
        try_init_logging(&LogConfig::test());
    }
}
