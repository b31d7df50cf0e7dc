//! The application: route registration, manifest building and dispatch.

use std::fmt;

use hestia_config::HestiaConfig;
use hestia_core::{Context, ErrorCategory, HestiaError, Reply, RequestId};
use hestia_extract::{InputValidator, RawRequest};
use http::Method;

use crate::manifest::{Manifest, ManifestBuilder};
use crate::registry::RouteRegistry;
use crate::route::{RouteBuilder, RouteOptions};

/// A Hestia application.
///
/// Routes are registered through `&mut self`; [`dispatch`](Self::dispatch)
/// and [`build`](Self::build) only need `&self`, so a built `App` can be
/// shared across tasks behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use hestia::prelude::*;
///
/// #[derive(Serialize, Describe)]
/// struct Greeting {
///     message: String,
/// }
///
/// # fn main() -> HestiaResult<()> {
/// let mut app = App::new();
/// app.get("/hello").handler(|ctx: Context| async move {
///     Ok(ctx.json_t(Greeting { message: "hi".to_string() }))
/// })?;
///
/// let manifest = app.build();
/// assert_eq!(
///     manifest.to_json().unwrap(),
///     serde_json::json!({
///         "get": {"/hello": {"input": "unknown", "output": {"json": {"message": "string"}}}}
///     })
/// );
/// # Ok(())
/// # }
/// ```
pub struct App {
    config: HestiaConfig,
    registry: RouteRegistry,
    validator: InputValidator,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an application with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HestiaConfig::default())
    }

    /// Creates an application with the given configuration.
    #[must_use]
    pub fn with_config(config: HestiaConfig) -> Self {
        let validator = InputValidator::new()
            .with_max_body_bytes(config.contract.max_body_bytes)
            .with_coercion(config.contract.coerce_string_sources);

        Self {
            config,
            registry: RouteRegistry::new(),
            validator,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HestiaConfig {
        &self.config
    }

    /// Returns the route registry.
    #[must_use]
    pub const fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Opens a route for `method` and `path`.
    pub fn route(&mut self, method: Method, path: impl Into<String>) -> RouteBuilder<'_> {
        let options = RouteOptions {
            reject_ambiguous_output: self.config.contract.reject_ambiguous_output,
        };
        RouteBuilder::new(&mut self.registry, options, method, path)
    }

    /// Opens a `GET` route.
    pub fn get(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::GET, path)
    }

    /// Opens a `POST` route.
    pub fn post(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::POST, path)
    }

    /// Opens a `PUT` route.
    pub fn put(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::PUT, path)
    }

    /// Opens a `DELETE` route.
    pub fn delete(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::DELETE, path)
    }

    /// Opens a `PATCH` route.
    pub fn patch(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::PATCH, path)
    }

    /// Opens an `OPTIONS` route.
    pub fn options(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::OPTIONS, path)
    }

    /// Opens a `HEAD` route.
    pub fn head(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::HEAD, path)
    }

    /// Builds the manifest of every registered route.
    #[must_use]
    pub fn build(&self) -> Manifest {
        ManifestBuilder::build(&self.registry)
    }

    /// Handles one request.
    ///
    /// 1. The first registration matching method and path is selected;
    ///    without one the reply is a `404` error envelope.
    /// 2. Its input contracts are validated; a failure replies `400` and the
    ///    handler is not called.
    /// 3. The handler runs with a fresh [`Context`]; an error it returns is
    ///    rendered as an envelope with the error's status.
    pub async fn dispatch(&self, request: RawRequest) -> Reply {
        let request_id = RequestId::new();
        let rid = request_id.to_string();
        let method = request.method().clone();
        let path = request.path().to_string();

        let Some((registration, params)) = self.registry.find(&method, &path) else {
            tracing::debug!(
                request_id = %rid,
                http.method = %method,
                http.path = %path,
                "no route matched"
            );
            let error = HestiaError::not_found(method.as_str(), path);
            return Reply::from_error(&error, Some(&rid));
        };

        tracing::debug!(
            request_id = %rid,
            http.method = %method,
            http.path = %path,
            route.pattern = %registration.path(),
            "route matched"
        );

        let request = request.with_params(params);
        let data = match self.validator.validate(&request, registration.inputs()) {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(
                    request_id = %rid,
                    route.pattern = %registration.path(),
                    input.source = %error.source,
                    input.path = %error.path,
                    error = %error.message,
                    "input validation failed"
                );
                return Reply::from_error(&HestiaError::from(error), Some(&rid));
            }
        };

        let ctx = Context::with_request_id(request.into_head(), request_id).with_validated(data);

        match (registration.handler())(ctx).await {
            Ok(reply) => {
                tracing::debug!(
                    request_id = %rid,
                    http.status_code = reply.status().as_u16(),
                    "request handled"
                );
                reply
            }
            Err(error) => {
                if error.category() == ErrorCategory::Validation {
                    tracing::warn!(request_id = %rid, error = %error, "handler rejected input");
                } else {
                    tracing::error!(
                        request_id = %rid,
                        route.pattern = %registration.path(),
                        error = %error,
                        "handler failed"
                    );
                }
                Reply::from_error(&error, Some(&rid))
            }
        }
    }

    /// Dispatches a bodiless request for `uri`.
    ///
    /// ```rust
    /// # use hestia::prelude::*;
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> HestiaResult<()> {
    /// let mut app = App::new();
    /// app.get("/ping").handler(|ctx: Context| async move { Ok(ctx.text("pong")) })?;
    ///
    /// let reply = app.request(Method::GET, "/ping").await;
    /// assert_eq!(reply.body_text(), Some("pong"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request(&self, method: Method, uri: &str) -> Reply {
        self.dispatch(RawRequest::builder().method(method).uri(uri).build())
            .await
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("routes", &self.registry.len())
            .finish_non_exhaustive()
    }
}
