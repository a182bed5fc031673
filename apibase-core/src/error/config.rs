//! Configuration validation error types.
//!
//! ```rust
//! use apibase_core::error::{ConfigValidationError, ValidationResult};
//!
//! fn validate_pending_limit(value: usize) -> Result<ValidationResult, ConfigValidationError> {
//!     if value == 0 {
//!         return Err(ConfigValidationError::too_low("pending_limit", value, 1));
//!     }
//!     Ok(ValidationResult::new())
//! }
//!
//! assert!(validate_pending_limit(0).is_err());
//! ```

use std::fmt;
use thiserror::Error;

/// Reasons a configuration value can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// Field value exceeds the maximum allowed value.
    #[error("Field '{field}' value {value} exceeds maximum {max}")]
    ValueTooHigh {
        /// The name of the configuration field
        field: &'static str,
        /// The actual value that was provided
        value: String,
        /// The maximum allowed value
        max: String,
    },

    /// Field value is below the minimum allowed value.
    #[error("Field '{field}' value {value} is below minimum {min}")]
    ValueTooLow {
        /// The name of the configuration field
        field: &'static str,
        /// The actual value that was provided
        value: String,
        /// The minimum allowed value
        min: String,
    },

    /// Field value is invalid for reasons other than range.
    #[error("Field '{field}' has invalid value: {reason}")]
    ValueInvalid {
        /// The name of the configuration field
        field: &'static str,
        /// The reason why the value is invalid
        reason: String,
    },

    /// Required field is missing.
    #[error("Required field '{field}' is missing")]
    ValueMissing {
        /// The name of the missing configuration field
        field: &'static str,
    },
}

impl ConfigValidationError {
    /// Returns the field name associated with this error.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            ConfigValidationError::ValueTooHigh { field, .. }
            | ConfigValidationError::ValueTooLow { field, .. }
            | ConfigValidationError::ValueInvalid { field, .. }
            | ConfigValidationError::ValueMissing { field } => field,
        }
    }

    /// Creates a new `ValueTooHigh` error.
    pub fn too_high<V: fmt::Display, M: fmt::Display>(
        field: &'static str,
        value: V,
        max: M,
    ) -> Self {
        ConfigValidationError::ValueTooHigh {
            field,
            value: value.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates a new `ValueTooLow` error.
    pub fn too_low<V: fmt::Display, M: fmt::Display>(
        field: &'static str,
        value: V,
        min: M,
    ) -> Self {
        ConfigValidationError::ValueTooLow {
            field,
            value: value.to_string(),
            min: min.to_string(),
        }
    }

    /// Creates a new `ValueInvalid` error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigValidationError::ValueInvalid {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a new `ValueMissing` error.
    pub fn missing(field: &'static str) -> Self {
        ConfigValidationError::ValueMissing { field }
    }
}

/// Outcome of a successful validation, possibly carrying warnings about
/// values that are legal but likely unintended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validation result with the given warnings.
    #[must_use]
    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self { warnings }
    }

    /// Adds a warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns `true` if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Merges another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_field_and_values() {
        let err = ConfigValidationError::too_high("cooldown", "120s", "60s");
        let msg = err.to_string();
        assert!(msg.contains("cooldown"));
        assert!(msg.contains("120s"));
        assert!(msg.contains("60s"));

        let err = ConfigValidationError::missing("base_path");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_field_name() {
        assert_eq!(
            ConfigValidationError::too_low("pending_limit", 0, 1).field_name(),
            "pending_limit"
        );
        assert_eq!(
            ConfigValidationError::invalid("base_path", "not a URL").field_name(),
            "base_path"
        );
        assert_eq!(ConfigValidationError::missing("id").field_name(), "id");
    }

    #[test]
    fn test_validation_result_merge() {
        let mut first = ValidationResult::new();
        assert!(!first.has_warnings());
        first.add_warning("cooldown is zero");

        let second = ValidationResult::with_warnings(vec!["timeout is short".to_string()]);
        first.merge(second);
        assert_eq!(first.warnings.len(), 2);
    }
}
