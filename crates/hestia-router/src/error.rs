//! Pattern parsing errors.

use thiserror::Error;

/// Error returned when a route path pattern cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path pattern '{pattern}': {reason}")]
pub struct PatternError {
    pattern: String,
    reason: String,
}

impl PatternError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_leading_slash(pattern: &str) -> Self {
        Self::new(pattern, "pattern must start with '/'")
    }

    pub(crate) fn empty_param_name(pattern: &str) -> Self {
        Self::new(pattern, "parameter name is empty")
    }

    pub(crate) fn invalid_param_name(pattern: &str, name: &str) -> Self {
        Self::new(
            pattern,
            format!("parameter name '{name}' may only contain ASCII letters, digits, '_' or '-'"),
        )
    }

    pub(crate) fn duplicate_param(pattern: &str, name: &str) -> Self {
        Self::new(pattern, format!("parameter '{name}' is declared more than once"))
    }

    pub(crate) fn wildcard_not_last(pattern: &str) -> Self {
        Self::new(pattern, "wildcard must be the last segment")
    }

    /// Returns the offending pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns why the pattern was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
