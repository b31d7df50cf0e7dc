//! Test response wrapper.

use bytes::Bytes;
use hestia::Reply;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A dispatched reply with helpers for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Wraps a reply returned by `App::dispatch`.
    pub fn from_reply(reply: Reply) -> Self {
        let response = reply.into_http();
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Returns the Content-Type header as a string.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        serde_json::from_slice(&self.body).map_err(TestError::Json)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Returns `error.code` from an error envelope body.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        self.json_value()
            .ok()?
            .pointer("/error/code")?
            .as_str()
            .map(str::to_string)
    }

    // Assertions

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} with body {:?}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts a 2xx status.
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "Expected success status, got {} with body {:?}",
            self.status,
            self.body
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self.header(name).and_then(|v| v.to_str().ok());
        assert_eq!(
            actual,
            Some(expected.as_ref()),
            "Header '{name}' mismatch"
        );
        self
    }

    /// Asserts that the body is JSON equal to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected, "JSON body mismatch"),
            Err(e) => panic!("Expected a JSON body: {e}"),
        }
        self
    }

    /// Asserts the `error.code` of an error envelope.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an envelope with that code.
    pub fn assert_error_code(&self, expected: &str) -> &Self {
        assert_eq!(
            self.error_code().as_deref(),
            Some(expected),
            "Error code mismatch in body {:?}",
            self.body
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_reply_keeps_status_headers_and_body() {
        let reply = Reply::json(&json!({"ok": true})).with_status(StatusCode::CREATED);
        let response = TestResponse::from_reply(reply);

        response
            .assert_status(StatusCode::CREATED)
            .assert_success()
            .assert_header("content-type", "application/json")
            .assert_json_eq(&json!({"ok": true}));
        assert_eq!(response.status_code(), 201);
    }

    #[test]
    fn test_text_and_invalid_utf8() {
        let response = TestResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from("hi"));
        assert_eq!(response.text().unwrap(), "hi");

        let response = TestResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from_static(&[0xff, 0xfe]),
        );
        assert!(matches!(response.text(), Err(TestError::BodyRead(_))));
    }

    #[test]
    fn test_error_code_of_envelope() {
        let error = hestia::HestiaError::not_found("GET", "/x");
        let response = TestResponse::from_reply(Reply::from_error(&error, None));

        response
            .assert_status(StatusCode::NOT_FOUND)
            .assert_error_code("NOT_FOUND");
    }

    #[test]
    #[should_panic(expected = "Expected status")]
    fn test_assert_status_panics() {
        let response = TestResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::new());
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
