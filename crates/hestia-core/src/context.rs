//! Request context types.
//!
//! The [`Context`] is created once per request, handed to the route's handler
//! by value and dropped when the handler finishes. It carries the validated
//! input, the raw request head, a typed state store and the reply helpers.

use http::{HeaderMap, Method, Uri};
use hestia_router::Params;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::contract::InputSource;
use crate::describe::Describe;
use crate::error::{HestiaError, HestiaResult};
use crate::reply::{Reply, TypedJson, TypedText};
use crate::state::StateStore;
use crate::validated::ValidatedData;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request logs sortable.
///
/// # Example
///
/// ```
/// use hestia_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Method, URI, headers and matched path parameters of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Params,
}

impl RequestHead {
    /// Creates a head with no headers and no parameters.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            params: Params::new(),
        }
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the path parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path component of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the matched path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Decodes the query string into name/value pairs in order.
    ///
    /// A malformed query string decodes to no pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.uri
            .query()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default()
    }
}

/// Per-request context handed to a route's handler.
///
/// # Example
///
/// ```
/// use hestia_core::{Context, InputSource, RequestHead, ValidatedData};
/// use http::Method;
/// use serde_json::json;
///
/// let head = RequestHead::new(Method::GET, "/search?q=rust".parse().unwrap());
/// let data = ValidatedData::empty()
///     .with_source(InputSource::Query, json!({"q": "rust"}).as_object().unwrap().clone());
/// let ctx = Context::new(head).with_validated(data);
///
/// assert_eq!(ctx.query("q").as_deref(), Some("rust"));
/// assert_eq!(ctx.validated_data().unwrap().get("q"), Some(&json!("rust")));
/// ```
#[derive(Debug)]
pub struct Context {
    request_id: RequestId,
    head: RequestHead,
    validated: Option<ValidatedData>,
    state: StateStore,
}

impl Context {
    /// Creates a context with a fresh request ID and no validated data.
    #[must_use]
    pub fn new(head: RequestHead) -> Self {
        Self::with_request_id(head, RequestId::new())
    }

    /// Creates a context with the given request ID.
    #[must_use]
    pub fn with_request_id(head: RequestHead, request_id: RequestId) -> Self {
        Self {
            request_id,
            head,
            validated: None,
            state: StateStore::new(),
        }
    }

    /// Attaches validated data.
    #[must_use]
    pub fn with_validated(mut self, data: ValidatedData) -> Self {
        self.validated = Some(data);
        self
    }

    /// Attaches validated data in place.
    pub fn set_validated(&mut self, data: ValidatedData) {
        self.validated = Some(data);
    }

    // Validated input

    /// Returns the validated input.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotValidated`] if validation has not attached
    /// any data to this context.
    pub fn validated_data(&self) -> HestiaResult<&ValidatedData> {
        self.validated.as_ref().ok_or(HestiaError::NotValidated)
    }

    /// Deserializes the merged validated input into `T`.
    pub fn valid<T: DeserializeOwned>(&self) -> HestiaResult<T> {
        self.validated_data()?.deserialize()
    }

    /// Returns one source's validated object.
    pub fn valid_source(&self, source: InputSource) -> HestiaResult<&Map<String, Value>> {
        self.validated_data()?.source(source)
    }

    // Raw request

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        self.head.method()
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.head.path()
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        self.head.uri()
    }

    /// Returns the raw request head.
    #[must_use]
    pub const fn head(&self) -> &RequestHead {
        &self.head
    }

    /// Returns a raw path parameter, whether or not a contract declared it.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.head.params().get(name)
    }

    /// Returns all raw path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        self.head.params()
    }

    /// Returns the first raw query value for `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        self.head
            .query_pairs()
            .into_iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Returns every raw query value for `name`.
    #[must_use]
    pub fn queries(&self, name: &str) -> Vec<String> {
        self.head
            .query_pairs()
            .into_iter()
            .filter_map(|(key, value)| (key == name).then_some(value))
            .collect()
    }

    /// Returns a request header as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    // State

    /// Stores a value for the rest of this request.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.state.set(key, value);
    }

    /// Returns a stored value if it is a `T`.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.state.get(key)
    }

    /// Returns a stored value.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::MissingState`] or
    /// [`HestiaError::StateTypeMismatch`].
    pub fn require<T: 'static>(&self, key: &str) -> HestiaResult<&T> {
        self.state.require(key)
    }

    /// Removes a stored value if it is a `T`.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        self.state.remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.state.contains(key)
    }

    /// Returns the state store.
    #[must_use]
    pub const fn state(&self) -> &StateStore {
        &self.state
    }

    /// Returns the state store mutably.
    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    // Replies

    /// A plain-text reply. Leaves the output contract unconstrained.
    #[must_use]
    pub fn text(&self, body: impl Into<String>) -> Reply {
        Reply::text(body)
    }

    /// A JSON reply. Leaves the output contract unconstrained.
    #[must_use]
    pub fn json(&self, value: Value) -> Reply {
        Reply::json(&value)
    }

    /// An HTML reply.
    #[must_use]
    pub fn html(&self, body: impl Into<String>) -> Reply {
        Reply::html(body)
    }

    /// A JSON reply that captures the shape of `T` as the output contract.
    #[must_use]
    pub fn json_t<T: Serialize + Describe>(&self, value: T) -> TypedJson<T> {
        TypedJson::new(value)
    }

    /// A text reply that captures a `text` output contract.
    #[must_use]
    pub fn text_t(&self, body: impl Into<String>) -> TypedText {
        TypedText::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;
    use serde_json::json;

    fn head(uri: &str) -> RequestHead {
        RequestHead::new(Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn test_request_id_is_v7() {
        let id = RequestId::new();
        assert_eq!(id.as_uuid().get_version_num(), 7);
        assert_ne!(RequestId::new(), id);
    }

    #[test]
    fn test_validated_data_before_validation() {
        let ctx = Context::new(head("/"));
        assert!(matches!(ctx.validated_data(), Err(HestiaError::NotValidated)));
        assert!(matches!(ctx.valid::<Value>(), Err(HestiaError::NotValidated)));
    }

    #[test]
    fn test_raw_params_independent_of_validation() {
        let params: Params = [("id", "42")].into_iter().collect();
        let ctx = Context::new(head("/post/42").with_params(params));

        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.path(), "/post/42");
    }

    #[test]
    fn test_query_values() {
        let ctx = Context::new(head("/search?tag=a&tag=b&q=hello%20world"));
        assert_eq!(ctx.query("q").as_deref(), Some("hello world"));
        assert_eq!(ctx.queries("tag"), vec!["a", "b"]);
        assert_eq!(ctx.query("page"), None);
    }

    #[test]
    fn test_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        let ctx = Context::new(head("/").with_headers(headers));

        assert_eq!(ctx.header("x-api-key"), Some("secret"));
        assert_eq!(ctx.header("X-Api-Key"), Some("secret"));
    }

    #[test]
    fn test_valid_source_requires_declared_source() {
        let data = ValidatedData::empty()
            .with_source(InputSource::Json, json!({"title": "x"}).as_object().unwrap().clone());
        let ctx = Context::new(head("/")).with_validated(data);

        assert_eq!(ctx.valid_source(InputSource::Json).unwrap()["title"], "x");
        assert!(matches!(
            ctx.valid_source(InputSource::Form),
            Err(HestiaError::UnknownSourceAccess(InputSource::Form))
        ));
    }

    #[test]
    fn test_state_roundtrip() {
        let mut ctx = Context::new(head("/"));
        ctx.set("user", "ada".to_string());

        assert!(ctx.contains("user"));
        assert_eq!(ctx.require::<String>("user").unwrap(), "ada");
        assert_eq!(ctx.remove::<String>("user").as_deref(), Some("ada"));
        assert!(ctx.get::<String>("user").is_none());
    }

    #[test]
    fn test_reply_helpers() {
        let ctx = Context::new(head("/"));
        assert_eq!(ctx.text("hi").body_text(), Some("hi"));
        assert_eq!(
            ctx.json(json!({"ok": true})).content_type(),
            Some("application/json")
        );
        assert_eq!(ctx.text_t("hi").as_str(), "hi");
        assert_eq!(ctx.json_t(7_u8).value(), &7);
    }
}
