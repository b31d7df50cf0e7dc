//! Test client driving an [`App`] in memory.

use std::sync::Arc;

use bytes::Bytes;
use hestia::extract::RawRequestBuilder;
use hestia::{App, RawRequest};
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::response::TestResponse;

/// A client that sends requests straight to [`App::dispatch`].
///
/// No listener is bound and no bytes cross a socket; the request goes
/// through routing, input validation and the handler exactly as it would
/// behind a transport.
///
/// # Example
///
/// ```rust
/// use hestia::prelude::*;
/// use hestia_test::TestClient;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> HestiaResult<()> {
/// let mut app = App::new();
/// app.get("/hello").handler(|ctx: Context| async move { Ok(ctx.text("hi")) })?;
///
/// let client = TestClient::new(app);
/// let response = client.get("/hello").send().await;
///
/// response.assert_status(StatusCode::OK);
/// assert_eq!(response.text().unwrap(), "hi");
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `app`.
    pub fn new(app: App) -> Self {
        Self::from_arc(Arc::new(app))
    }

    /// Creates a client for a shared app.
    pub fn from_arc(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Returns the app under test.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates an OPTIONS request builder.
    pub fn options(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, method, uri.into())
    }

    async fn send_internal(&self, request: RawRequest) -> TestResponse {
        TestResponse::from_reply(self.app.dispatch(request).await)
    }
}

/// A request builder bound to a test client.
#[must_use = "a test request does nothing until sent"]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    uri: String,
    query: Vec<String>,
    builder: RawRequestBuilder,
    error: Option<TestError>,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, method: Method, uri: String) -> Self {
        let mut builder = RawRequest::builder().method(method);
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self {
            client,
            uri,
            query: Vec::new(),
            builder,
            error: None,
        }
    }

    /// Appends query parameters encoded from `value`.
    pub fn query<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) if encoded.is_empty() => {}
            Ok(encoded) => self.query.push(encoded),
            Err(e) => self.fail(TestError::RequestBuild(e.to_string())),
        }
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name.as_ref(), value.as_ref());
        self
    }

    /// Adds a `cookie` header entry.
    pub fn cookie(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let pair = format!("{}={}", name.as_ref(), value.as_ref());
        self.header("cookie", pair)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body and content type.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Err(e) = serde_json::to_vec(value) {
            self.fail(TestError::Json(e));
            return self;
        }
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a URL-encoded form body and content type.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Err(e) = serde_urlencoded::to_string(value) {
            self.fail(TestError::RequestBuild(e.to_string()));
            return self;
        }
        self.builder = self.builder.form(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if a query, JSON or form value could not be encoded. Use
    /// [`try_send`](Self::try_send) to get the error instead.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("invalid test request: {e}"),
        }
    }

    /// Sends the request, returning encoding failures as errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri = if self.query.is_empty() {
            self.uri
        } else {
            let separator = if self.uri.contains('?') { '&' } else { '?' };
            format!("{}{}{}", self.uri, separator, self.query.join("&"))
        };

        let request = self.builder.uri(&uri).build();
        Ok(self.client.send_internal(request).await)
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia::prelude::*;
    use serde_json::json;

    fn app() -> App {
        let mut app = App::new();
        app.get("/echo")
            .input(InputContract::query(
                Shape::object()
                    .field("page", Shape::integer())
                    .optional("tag", Shape::string()),
            ))
            .handler(|ctx: Context| async move {
                Ok(ctx.json(json!({
                    "query": serde_json::Value::Object(ctx.valid_source(InputSource::Query)?.clone()),
                    "agent": ctx.header("x-agent"),
                })))
            })
            .unwrap();
        app
    }

    #[tokio::test]
    async fn test_query_builder_and_default_header() {
        let client = TestClient::new(app()).with_default_header("x-agent", "tests");

        let response = client
            .get("/echo")
            .query(&[("page", "2"), ("tag", "rust")])
            .send()
            .await;

        response.assert_status(StatusCode::OK).assert_json_eq(&json!({
            "query": {"page": 2, "tag": "rust"},
            "agent": "tests",
        }));
    }

    #[tokio::test]
    async fn test_query_appends_to_existing_query_string() {
        let client = TestClient::new(app());
        let response = client.get("/echo?tag=a").query(&[("page", "1")]).send().await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["query"], json!({"page": 1, "tag": "a"}));
    }

    #[tokio::test]
    async fn test_validation_failure_surfaces_as_400() {
        let client = TestClient::new(app());
        client
            .get("/echo")
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_code("VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_encoding_error_reported_by_try_send() {
        let client = TestClient::new(app());
        let nested = json!({"a": {"b": 1}});

        let result = client.get("/echo").query(&nested).try_send().await;
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }
}
