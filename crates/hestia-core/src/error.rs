//! Error types for Hestia.
//!
//! [`HestiaError`] covers both halves of a route's life: registration-time
//! contract mistakes (ambiguous output capture, duplicate sources, bad path
//! patterns) and request-time failures (validation, state lookups, handler
//! errors). Every variant maps to an [`ErrorCategory`] and from there to an
//! HTTP status, and renders as the JSON [`ErrorEnvelope`] dispatch returns.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::contract::InputSource;

/// Result type alias using [`HestiaError`].
pub type HestiaResult<T> = Result<T, HestiaError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request did not satisfy an input contract.
    Validation,
    /// A handler used validated data in a way its contracts do not allow.
    Contract,
    /// A route definition was rejected when it was sealed.
    Registration,
    /// Per-request state lookup failed.
    State,
    /// No route answers the request.
    NotFound,
    /// Handler failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Contract | Self::Registration | Self::State | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A request input that failed its contract.
///
/// Only the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The source whose contract failed.
    pub source: InputSource,
    /// JSON path of the offending value, rooted at `$`.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(source: InputSource, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an error about the source as a whole (undecodable body, wrong
    /// content type) rather than one of its fields.
    #[must_use]
    pub fn decode(source: InputSource, message: impl Into<String>) -> Self {
        Self::new(source, "$", message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} input at '{}': {}",
            self.source, self.path, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Standard error type for Hestia.
///
/// # Example
///
/// ```
/// use hestia_core::{ErrorCategory, HestiaError};
///
/// let error = HestiaError::missing_state("db");
/// assert_eq!(error.category(), ErrorCategory::State);
/// assert_eq!(error.status_code().as_u16(), 500);
/// ```
#[derive(Error, Debug)]
pub enum HestiaError {
    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Validated data was read for a source the route never declared.
    #[error("no input contract was declared for source '{0}'")]
    UnknownSourceAccess(InputSource),

    /// Validated data was read before validation attached it.
    #[error("validated data is not available before input validation has run")]
    NotValidated,

    /// A route captured an output contract more than once.
    #[error("route {method} {path} declares more than one output contract")]
    AmbiguousOutputCapture {
        /// The route method.
        method: String,
        /// The route path pattern.
        path: String,
    },

    /// A route attached two input contracts for the same source.
    #[error("input contract for source '{0}' is declared more than once")]
    DuplicateSource(InputSource),

    /// An input contract's shape cannot describe a decoded source.
    #[error("input contract for source '{input}' must describe an object, got {shape}")]
    InvalidInputShape {
        /// The source the contract reads.
        input: InputSource,
        /// The declared shape.
        shape: String,
    },

    /// A route path pattern could not be parsed.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPathPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path-parameter contract names a parameter the pattern does not declare.
    #[error("path parameter '{param}' is not declared by pattern '{pattern}'")]
    UndeclaredPathParam {
        /// The contract field name.
        param: String,
        /// The route path pattern.
        pattern: String,
    },

    /// A required state entry was never set.
    #[error("state entry '{key}' is not set")]
    MissingState {
        /// The state key.
        key: String,
    },

    /// A state entry holds a different type than requested.
    #[error("state entry '{key}' is not of type {expected}")]
    StateTypeMismatch {
        /// The state key.
        key: String,
        /// The requested type.
        expected: &'static str,
    },

    /// Validated data could not be converted to the requested Rust type.
    #[error("cannot deserialize validated data into {target}: {message}")]
    Deserialize {
        /// The requested type.
        target: &'static str,
        /// The serde error message.
        message: String,
    },

    /// No registration matches the request.
    #[error("no route matches {method} {path}")]
    NotFound {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// The handler failed.
    #[error("{message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HestiaError {
    /// Creates an ambiguous output capture error.
    #[must_use]
    pub fn ambiguous_output(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::AmbiguousOutputCapture {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates a missing state error.
    #[must_use]
    pub fn missing_state(key: impl Into<String>) -> Self {
        Self::MissingState { key: key.into() }
    }

    /// Creates a state type mismatch error for `T`.
    #[must_use]
    pub fn state_type_mismatch<T: ?Sized>(key: impl Into<String>) -> Self {
        Self::StateTypeMismatch {
            key: key.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Creates a deserialization error for `T`.
    #[must_use]
    pub fn deserialize<T: ?Sized>(error: &serde_json::Error) -> Self {
        Self::Deserialize {
            target: std::any::type_name::<T>(),
            message: error.to_string(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Deserialize { .. } => ErrorCategory::Validation,
            Self::UnknownSourceAccess(_) | Self::NotValidated => ErrorCategory::Contract,
            Self::AmbiguousOutputCapture { .. }
            | Self::DuplicateSource(_)
            | Self::InvalidInputShape { .. }
            | Self::InvalidPathPattern { .. }
            | Self::UndeclaredPathParam { .. } => ErrorCategory::Registration,
            Self::MissingState { .. } | Self::StateTypeMismatch { .. } => ErrorCategory::State,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Handler { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns `true` for errors raised while sealing a route.
    #[must_use]
    pub const fn is_registration(&self) -> bool {
        matches!(self.category(), ErrorCategory::Registration)
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnknownSourceAccess(_) => "UNKNOWN_SOURCE_ACCESS",
            Self::NotValidated => "NOT_VALIDATED",
            Self::AmbiguousOutputCapture { .. } => "AMBIGUOUS_OUTPUT_CAPTURE",
            Self::DuplicateSource(_) => "DUPLICATE_SOURCE",
            Self::InvalidInputShape { .. } => "INVALID_INPUT_SHAPE",
            Self::InvalidPathPattern { .. } => "INVALID_PATH_PATTERN",
            Self::UndeclaredPathParam { .. } => "UNDECLARED_PATH_PARAM",
            Self::MissingState { .. } => "MISSING_STATE",
            Self::StateTypeMismatch { .. } => "STATE_TYPE_MISMATCH",
            Self::Deserialize { .. } => "DESERIALIZE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Handler { .. } => "INTERNAL_ERROR",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(error) => Some(serde_json::json!({
                "source": error.source,
                "path": error.path,
            })),
            Self::UnknownSourceAccess(source) | Self::DuplicateSource(source) => {
                Some(serde_json::json!({ "source": source }))
            }
            Self::InvalidInputShape { input, shape } => Some(serde_json::json!({
                "source": input,
                "shape": shape,
            })),
            Self::Deserialize { target, .. } => Some(serde_json::json!({ "target": target })),
            Self::NotFound { method, path } => Some(serde_json::json!({
                "method": method,
                "path": path,
            })),
            Self::MissingState { key } | Self::StateTypeMismatch { key, .. } => {
                Some(serde_json::json!({ "key": key }))
            }
            _ => None,
        }
    }
}

impl From<hestia_router::PatternError> for HestiaError {
    fn from(error: hestia_router::PatternError) -> Self {
        Self::InvalidPathPattern {
            pattern: error.pattern().to_string(),
            reason: error.reason().to_string(),
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_and_status() {
        let error: HestiaError =
            ValidationError::new(InputSource::Query, "$.page", "missing required field").into();

        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.to_string(),
            "invalid query input at '$.page': missing required field"
        );
    }

    #[test]
    fn test_validation_envelope_carries_source_and_path() {
        let error = HestiaError::from(ValidationError::new(
            InputSource::Json,
            "$.title",
            "expected string, got number",
        ));
        let envelope = error.to_envelope(Some("req-1"));

        assert_eq!(envelope.error.code, "VALIDATION_ERROR");
        let details = envelope.error.details.unwrap();
        assert_eq!(details["source"], "json");
        assert_eq!(details["path"], "$.title");
    }

    #[test]
    fn test_registration_errors() {
        let error = HestiaError::ambiguous_output("GET", "/hello");
        assert!(error.is_registration());
        assert!(error.to_string().contains("GET /hello"));

        let error = HestiaError::DuplicateSource(InputSource::Json);
        assert!(error.is_registration());
        assert!(!HestiaError::NotValidated.is_registration());
    }

    #[test]
    fn test_pattern_error_conversion() {
        let pattern_error = hestia_router::PathPattern::parse("no-slash").unwrap_err();
        let error = HestiaError::from(pattern_error);

        match error {
            HestiaError::InvalidPathPattern { pattern, .. } => assert_eq!(pattern, "no-slash"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_state_type_mismatch_names_type() {
        let error = HestiaError::state_type_mismatch::<u32>("count");
        assert!(error.to_string().contains("u32"));
        assert_eq!(error.category(), ErrorCategory::State);
    }

    #[test]
    fn test_not_found_envelope_serialization() {
        let error = HestiaError::not_found("GET", "/missing");
        let envelope = error.to_envelope(Some("req-456"));

        let json = serde_json::to_string(&envelope).expect("serialization should work");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("\"request_id\":\"req-456\""));
        assert!(json.contains("\"category\":\"not_found\""));
    }

    #[test]
    fn test_handler_error_keeps_source_private() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = HestiaError::handler_with_source("could not save post", io);

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.message, "could not save post");
        assert!(envelope.error.details.is_none());
    }
}
