//! The raw request as it reaches the contract layer.

use bytes::Bytes;
use hestia_core::RequestHead;
use hestia_router::Params;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use serde::Serialize;

/// An incoming request before validation.
///
/// Path parameters are empty until routing fills them in with
/// [`with_params`](Self::with_params).
///
/// # Example
///
/// ```rust
/// use hestia_extract::RawRequest;
/// use http::Method;
///
/// let request = RawRequest::builder()
///     .method(Method::POST)
///     .uri("/posts?draft=true")
///     .header("x-api-key", "secret")
///     .json(&serde_json::json!({"title": "Hello"}))
///     .build();
///
/// assert_eq!(request.path(), "/posts");
/// assert_eq!(request.query_string(), Some("draft=true"));
/// assert_eq!(request.content_type(), Some("application/json"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
}

impl RawRequest {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            ..Self::default()
        }
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RawRequestBuilder {
        RawRequestBuilder::new()
    }

    /// Converts an `http` request.
    #[must_use]
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: Params::new(),
        }
    }

    /// Sets the matched path parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the matched path parameters in place.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the matched path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Drops the body and returns the head the handler context is built from.
    #[must_use]
    pub fn into_head(self) -> RequestHead {
        RequestHead::new(self.method, self.uri)
            .with_headers(self.headers)
            .with_params(self.params)
    }
}

impl From<http::Request<Bytes>> for RawRequest {
    fn from(request: http::Request<Bytes>) -> Self {
        Self::from_http(request)
    }
}

/// Builder for constructing a [`RawRequest`].
#[derive(Debug, Default)]
pub struct RawRequestBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
}

impl RawRequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. An unparseable URI is ignored; the default is `/`.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        if let Ok(uri) = uri.parse() {
            self.uri = Some(uri);
        }
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Ok(body) = serde_json::to_vec(value) {
            self.body = Bytes::from(body);
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        self
    }

    /// Sets a URL-encoded form body and the matching Content-Type.
    #[must_use]
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Ok(body) = serde_urlencoded::to_string(value) {
            self.body = Bytes::from(body);
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> RawRequest {
        RawRequest {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            params: Params::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = RawRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.body().is_empty());
        assert!(request.params().is_empty());
    }

    #[test]
    fn test_form_body() {
        let request = RawRequest::builder()
            .method(Method::POST)
            .form(&[("name", "Ada Lovelace")])
            .build();

        assert_eq!(request.body().as_ref(), b"name=Ada+Lovelace");
        assert_eq!(
            request.content_type(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let request = RawRequest::builder().header("bad header", "x").build();
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_into_head_keeps_params() {
        let request = RawRequest::new(Method::GET, Uri::from_static("/post/1"))
            .with_params([("id", "1")].into_iter().collect());
        let head = request.into_head();

        assert_eq!(head.params().get("id"), Some("1"));
        assert_eq!(head.path(), "/post/1");
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/items/3")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let raw = RawRequest::from(request);
        assert_eq!(raw.method(), &Method::PUT);
        assert_eq!(raw.body().as_ref(), b"{}");
    }
}
