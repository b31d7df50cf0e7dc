//! Handler results.
//!
//! A handler returns something that implements [`IntoReply`]. Plain
//! [`Reply`] values carry no output contract. The capturing wrappers
//! [`TypedJson`] and [`TypedText`] declare one through
//! [`IntoReply::output_contract`], which registration reads from the
//! handler's return type without ever running it.
//!
//! | Result type | Content-Type | Output contract |
//! |-------------|--------------|-----------------|
//! | [`Reply`] | as built | unconstrained |
//! | `String`, `&'static str` | `text/plain` | unconstrained |
//! | `serde_json::Value` | `application/json` | unconstrained |
//! | [`TypedJson<T>`] | `application/json` | `{ json: shape of T }` |
//! | [`TypedText`] | `text/plain` | `{ text: string }` |

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::contract::OutputContract;
use crate::describe::Describe;
use crate::error::{HestiaError, HestiaResult};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

/// A finished response.
///
/// # Example
///
/// ```
/// use hestia_core::Reply;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let reply = Reply::json(&json!({"message": "hello"})).with_status(StatusCode::CREATED);
///
/// assert_eq!(reply.status(), StatusCode::CREATED);
/// assert_eq!(reply.content_type(), Some("application/json"));
/// assert_eq!(reply.body_text(), Some(r#"{"message":"hello"}"#));
/// ```
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    /// A response with the given status, no headers and an empty body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A `200 OK` JSON response.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::with_body(JSON, Bytes::from(value.to_string()))
    }

    /// A `200 OK` plain-text response.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_body(TEXT, Bytes::from(body.into()))
    }

    /// A `200 OK` HTML response.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_body(HTML, Bytes::from(body.into()))
    }

    /// The JSON error envelope for `error`, with the error's status.
    #[must_use]
    pub fn from_error(error: &HestiaError, request_id: Option<&str>) -> Self {
        let envelope = error.to_envelope(request_id);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        Self::with_body(JSON, Bytes::from(body)).with_status(error.status_code())
    }

    fn with_body(content_type: &'static str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// Overrides the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the `Content-Type` header, if set and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Converts into an `http` response.
    #[must_use]
    pub fn into_http(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Reply> for Response<Bytes> {
    fn from(reply: Reply) -> Self {
        reply.into_http()
    }
}

/// Conversion of a handler result into a [`Reply`].
pub trait IntoReply: Send {
    /// Builds the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    fn into_reply(self) -> HestiaResult<Reply>;

    /// The output contract this result type captures, if any.
    ///
    /// Only called on the type, at registration time.
    #[must_use]
    fn output_contract() -> Option<OutputContract>
    where
        Self: Sized,
    {
        None
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> HestiaResult<Reply> {
        Ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> HestiaResult<Reply> {
        Ok(Reply::text(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> HestiaResult<Reply> {
        Ok(Reply::text(self))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> HestiaResult<Reply> {
        Ok(Reply::json(&self))
    }
}

/// A JSON result whose shape is captured as the route's output contract.
///
/// Usually built with [`Context::json_t`](crate::Context::json_t).
#[derive(Debug, Clone)]
pub struct TypedJson<T> {
    value: T,
    status: StatusCode,
}

impl<T: Serialize + Describe> TypedJson<T> {
    /// Wraps `value` with status `200 OK`.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            status: StatusCode::OK,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Serialize + Describe + Send> IntoReply for TypedJson<T> {
    fn into_reply(self) -> HestiaResult<Reply> {
        let body = serde_json::to_vec(&self.value)
            .map_err(|e| HestiaError::handler_with_source("failed to encode JSON response", e))?;
        Ok(Reply::with_body(JSON, Bytes::from(body)).with_status(self.status))
    }

    fn output_contract() -> Option<OutputContract> {
        Some(OutputContract::typed_json::<T>())
    }
}

/// A text result captured as a `text` output contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedText(String);

impl TypedText {
    /// Wraps `body`.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl IntoReply for TypedText {
    fn into_reply(self) -> HestiaResult<Reply> {
        Ok(Reply::text(self.0))
    }

    fn output_contract() -> Option<OutputContract> {
        Some(OutputContract::text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use serde_json::json;

    #[derive(Serialize)]
    struct Greeting {
        message: String,
    }

    impl Describe for Greeting {
        fn shape() -> Shape {
            Shape::object().field("message", String::shape())
        }
    }

    #[test]
    fn test_plain_replies_are_unconstrained() {
        assert!(Reply::output_contract().is_none());
        assert!(String::output_contract().is_none());
        assert!(<&'static str>::output_contract().is_none());
        assert!(Value::output_contract().is_none());
    }

    #[test]
    fn test_typed_json_captures_shape() {
        let contract = TypedJson::<Greeting>::output_contract().unwrap();
        assert_eq!(
            serde_json::to_value(&contract).unwrap(),
            json!({"json": {"message": "string"}})
        );

        let reply = TypedJson::new(Greeting {
            message: "hi".to_string(),
        })
        .into_reply()
        .unwrap();
        assert_eq!(reply.content_type(), Some(JSON));
        assert_eq!(reply.body_text(), Some(r#"{"message":"hi"}"#));
    }

    #[test]
    fn test_typed_text_captures_text() {
        assert_eq!(TypedText::output_contract(), Some(OutputContract::text()));
        let reply = TypedText::new("hello").into_reply().unwrap();
        assert_eq!(reply.body_text(), Some("hello"));
        assert_eq!(reply.content_type(), Some(TEXT));
    }

    #[test]
    fn test_error_reply_uses_envelope() {
        let error = HestiaError::not_found("GET", "/nope");
        let reply = Reply::from_error(&error, Some("req-1"));

        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["request_id"], "req-1");
    }

    #[test]
    fn test_into_http() {
        let response = Reply::html("<h1>hi</h1>")
            .with_status(StatusCode::ACCEPTED)
            .with_header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("abc"),
            )
            .into_http();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-trace"], "abc");
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
        assert_eq!(response.body().as_ref(), b"<h1>hi</h1>");
    }
}
