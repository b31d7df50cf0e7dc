//! The input validator.

use hestia_core::{InputContracts, ValidatedData, ValidationError};

use crate::raw::RawRequest;
use crate::source;

/// Default maximum body size for `json` and `form` sources (1 MB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Checks a raw request against a route's input contracts.
///
/// Contracts are checked in attachment order and the first failure stops
/// validation. A route with no contracts validates without reading the
/// request at all.
///
/// # Example
///
/// ```rust
/// use hestia_core::{InputContract, InputContracts, Shape};
/// use hestia_extract::{InputValidator, RawRequest};
///
/// let mut contracts = InputContracts::new();
/// contracts
///     .push(InputContract::query(Shape::object().field("page", Shape::number())))
///     .unwrap();
///
/// let validator = InputValidator::new();
///
/// let ok = RawRequest::builder().uri("/posts?page=2").build();
/// let data = validator.validate(&ok, &contracts).unwrap();
/// assert_eq!(data.get("page"), Some(&serde_json::json!(2)));
///
/// let missing = RawRequest::builder().uri("/posts").build();
/// let err = validator.validate(&missing, &contracts).unwrap_err();
/// assert_eq!(err.path, "$.page");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValidator {
    max_body_bytes: usize,
    coerce_string_sources: bool,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            coerce_string_sources: true,
        }
    }
}

impl InputValidator {
    /// Creates a validator with the default limits and coercion enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum accepted body size.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Enables or disables coercion of string sources before validation.
    ///
    /// With coercion disabled, a query contract declaring `page: number`
    /// rejects `?page=2` because the decoded value is the string `"2"`.
    #[must_use]
    pub const fn with_coercion(mut self, enabled: bool) -> Self {
        self.coerce_string_sources = enabled;
        self
    }

    /// Returns the maximum accepted body size.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns `true` if string sources are coerced.
    #[must_use]
    pub const fn coerces_string_sources(&self) -> bool {
        self.coerce_string_sources
    }

    /// Validates `request` against `contracts`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered: a source that cannot
    /// be decoded, or a decoded value that does not satisfy its shape.
    pub fn validate(
        &self,
        request: &RawRequest,
        contracts: &InputContracts,
    ) -> Result<ValidatedData, ValidationError> {
        let mut data = ValidatedData::empty();
        if contracts.is_empty() {
            return Ok(data);
        }

        for contract in contracts {
            let source = contract.source();
            let mut fields = source::decode(source, request, self.max_body_bytes)?;

            // Contract sets only hold object or unknown shapes.
            if let Some(object) = contract.shape().as_object() {
                if self.coerce_string_sources && source.is_string_source() {
                    object.coerce_fields(&mut fields);
                }
                object.validate_fields(&fields).map_err(|mismatch| {
                    ValidationError::new(source, mismatch.path, mismatch.message)
                })?;
            }

            tracing::trace!(input.source = %source, "input contract satisfied");
            data = data.with_source(source, fields);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_core::{InputContract, InputSource, Shape};
    use http::Method;
    use serde_json::json;

    fn contracts(list: Vec<InputContract>) -> InputContracts {
        let mut contracts = InputContracts::new();
        for contract in list {
            contracts.push(contract).unwrap();
        }
        contracts
    }

    #[test]
    fn test_zero_contracts_short_circuit() {
        // Malformed body with a JSON content type would fail if it were read.
        let request = RawRequest::builder()
            .header("content-type", "application/json")
            .body("{oops")
            .build();

        let data = InputValidator::new()
            .validate(&request, &InputContracts::new())
            .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_param_contract() {
        let request = RawRequest::builder()
            .uri("/post/123")
            .build()
            .with_params([("id", "123")].into_iter().collect());
        let contracts = contracts(vec![InputContract::param(
            Shape::object().field("id", Shape::string()),
        )]);

        let data = InputValidator::new().validate(&request, &contracts).unwrap();
        assert_eq!(data.get("id"), Some(&json!("123")));
    }

    #[test]
    fn test_missing_query_field_fails() {
        let request = RawRequest::builder().uri("/posts").build();
        let contracts = contracts(vec![InputContract::query(
            Shape::object().field("page", Shape::number()),
        )]);

        let err = InputValidator::new()
            .validate(&request, &contracts)
            .unwrap_err();
        assert_eq!(err.source, InputSource::Query);
        assert_eq!(err.path, "$.page");
    }

    #[test]
    fn test_coercion_can_be_disabled() {
        let request = RawRequest::builder().uri("/posts?page=2").build();
        let contracts = contracts(vec![InputContract::query(
            Shape::object().field("page", Shape::number()),
        )]);

        assert!(InputValidator::new().validate(&request, &contracts).is_ok());
        let err = InputValidator::new()
            .with_coercion(false)
            .validate(&request, &contracts)
            .unwrap_err();
        assert_eq!(err.message, "expected number, got string");
    }

    #[test]
    fn test_json_is_never_coerced() {
        let request = RawRequest::builder()
            .method(Method::POST)
            .json(&json!({"count": "3"}))
            .build();
        let contracts = contracts(vec![InputContract::json(
            Shape::object().field("count", Shape::integer()),
        )]);

        let err = InputValidator::new()
            .validate(&request, &contracts)
            .unwrap_err();
        assert_eq!(err.source, InputSource::Json);
        assert_eq!(err.path, "$.count");
    }

    #[test]
    fn test_first_failure_wins() {
        let request = RawRequest::builder().uri("/search").build();
        let contracts = contracts(vec![
            InputContract::query(Shape::object().field("q", Shape::string())),
            InputContract::header(Shape::object().field("x-api-key", Shape::string())),
        ]);

        let err = InputValidator::new()
            .validate(&request, &contracts)
            .unwrap_err();
        assert_eq!(err.source, InputSource::Query);
    }

    #[test]
    fn test_merge_across_sources_later_wins() {
        let request = RawRequest::builder()
            .method(Method::PUT)
            .uri("/post/7")
            .json(&json!({"id": 9, "title": "Hello"}))
            .build()
            .with_params([("id", "7")].into_iter().collect());
        let contracts = contracts(vec![
            InputContract::param(Shape::object().field("id", Shape::integer())),
            InputContract::json(
                Shape::object()
                    .field("id", Shape::integer())
                    .field("title", Shape::string()),
            ),
        ]);

        let data = InputValidator::new().validate(&request, &contracts).unwrap();
        assert_eq!(data.get("id"), Some(&json!(9)));
        assert_eq!(data.source(InputSource::Param).unwrap()["id"], json!(7));
        assert_eq!(data.get("title"), Some(&json!("Hello")));
    }

    #[test]
    fn test_array_query_field() {
        let request = RawRequest::builder().uri("/filter?tag=rust").build();
        let contracts = contracts(vec![InputContract::query(
            Shape::object().field("tag", Shape::array(Shape::string())),
        )]);

        let data = InputValidator::new().validate(&request, &contracts).unwrap();
        assert_eq!(data.get("tag"), Some(&json!(["rust"])));
    }
}
