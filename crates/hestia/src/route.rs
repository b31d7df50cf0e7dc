//! Route declaration.
//!
//! A route is *open* while its [`RouteBuilder`] is alive: contracts and a
//! description can still be attached. Calling [`RouteBuilder::handler`] or
//! [`RouteBuilder::handler_with`] seals it into an immutable
//! [`Registration`] inside the [`RouteRegistry`](crate::RouteRegistry).

use std::fmt;
use std::future::Future;

use hestia_core::{
    Context, Describe, HestiaError, HestiaResult, InputContract, InputContracts, InputSource,
    IntoReply, OutputContract,
};
use hestia_router::PathPattern;
use http::Method;
use serde::de::DeserializeOwned;

use crate::handler::{self, ErasedHandler};
use crate::registry::RouteRegistry;

/// Identifies a sealed registration within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(pub(crate) usize);

impl RegistrationHandle {
    /// Position of the registration in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// Registration-time behavior taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RouteOptions {
    pub(crate) reject_ambiguous_output: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            reject_ambiguous_output: true,
        }
    }
}

/// A checked route waiting for the registry to assign its handle.
pub(crate) struct RouteDefinition {
    pub(crate) method: Method,
    pub(crate) pattern: PathPattern,
    pub(crate) inputs: InputContracts,
    pub(crate) output: Option<OutputContract>,
    pub(crate) description: Option<String>,
    pub(crate) handler: ErasedHandler,
}

/// A sealed route.
///
/// Everything here is fixed once the route is registered; only getters are
/// exposed.
pub struct Registration {
    id: RegistrationHandle,
    method: Method,
    pattern: PathPattern,
    inputs: InputContracts,
    output: Option<OutputContract>,
    description: Option<String>,
    handler: ErasedHandler,
}

impl Registration {
    pub(crate) fn new(id: RegistrationHandle, definition: RouteDefinition) -> Self {
        Self {
            id,
            method: definition.method,
            pattern: definition.pattern,
            inputs: definition.inputs,
            output: definition.output,
            description: definition.description,
            handler: definition.handler,
        }
    }

    /// The registration's handle.
    #[must_use]
    pub const fn id(&self) -> RegistrationHandle {
        self.id
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The path pattern as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// The parsed path pattern.
    #[must_use]
    pub const fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The input contracts in attachment order.
    #[must_use]
    pub const fn inputs(&self) -> &InputContracts {
        &self.inputs
    }

    /// The captured output contract; `None` means unconstrained.
    #[must_use]
    pub const fn output(&self) -> Option<&OutputContract> {
        self.output.as_ref()
    }

    /// Human summary, if one was given.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn handler(&self) -> &ErasedHandler {
        &self.handler
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path())
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Builder for one route, borrowed from the registry until sealed.
///
/// Errors found while attaching contracts are held and reported when the
/// route is sealed, so the chain reads top to bottom.
///
/// ```rust,ignore
/// app.get("/post/:id")
///     .input(InputContract::param(Shape::object().field("id", Shape::integer())))
///     .describe("Fetch one post")
///     .handler(|ctx: Context| async move {
///         let id = ctx.valid_source(InputSource::Param)?["id"].clone();
///         Ok(ctx.json(json!({ "id": id })))
///     })?;
/// ```
#[must_use = "a route is only registered once a handler is attached"]
pub struct RouteBuilder<'app> {
    registry: &'app mut RouteRegistry,
    options: RouteOptions,
    method: Method,
    path: String,
    inputs: InputContracts,
    output: Option<OutputContract>,
    description: Option<String>,
    error: Option<HestiaError>,
}

impl<'app> RouteBuilder<'app> {
    pub(crate) fn new(
        registry: &'app mut RouteRegistry,
        options: RouteOptions,
        method: Method,
        path: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            options,
            method,
            path: path.into(),
            inputs: InputContracts::default(),
            output: None,
            description: None,
            error: None,
        }
    }

    /// Attaches an input contract.
    ///
    /// At most one contract per source; a second one for the same source
    /// fails when the route is sealed.
    pub fn input(mut self, contract: InputContract) -> Self {
        if let Err(error) = self.inputs.push(contract) {
            self.fail(error);
        }
        self
    }

    /// Attaches an input contract whose shape comes from `T`.
    pub fn input_typed<T: Describe>(self, source: InputSource) -> Self {
        self.input(InputContract::typed::<T>(source))
    }

    /// Declares the output contract explicitly.
    pub fn output(mut self, contract: OutputContract) -> Self {
        self.capture(contract);
        self
    }

    /// Sets a human summary carried into the manifest.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Seals the route with a handler receiving the [`Context`].
    ///
    /// If `R` captures an output contract, it is recorded here from the
    /// type alone; the handler never runs at registration.
    ///
    /// # Errors
    ///
    /// - [`HestiaError::InvalidPathPattern`] for a malformed path
    /// - [`HestiaError::DuplicateSource`] for two contracts on one source
    /// - [`HestiaError::UndeclaredPathParam`] for a param contract naming a
    ///   parameter the path lacks
    /// - [`HestiaError::AmbiguousOutputCapture`] for two output captures when
    ///   `contract.reject_ambiguous_output` is on
    pub fn handler<F, Fut, R>(mut self, f: F) -> HestiaResult<RegistrationHandle>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HestiaResult<R>> + Send + 'static,
        R: IntoReply + 'static,
    {
        if let Some(contract) = R::output_contract() {
            self.capture(contract);
        }
        self.seal(handler::erase(f))
    }

    /// Seals the route with a handler that also receives the merged
    /// validated input deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`handler`](Self::handler).
    pub fn handler_with<T, F, Fut, R>(mut self, f: F) -> HestiaResult<RegistrationHandle>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(Context, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HestiaResult<R>> + Send + 'static,
        R: IntoReply + 'static,
    {
        if let Some(contract) = R::output_contract() {
            self.capture(contract);
        }
        self.seal(handler::erase_with::<T, _, _, _>(f))
    }

    fn capture(&mut self, contract: OutputContract) {
        if self.output.is_none() {
            self.output = Some(contract);
            return;
        }

        if self.options.reject_ambiguous_output {
            self.fail(HestiaError::ambiguous_output(
                self.method.as_str(),
                self.path.clone(),
            ));
        } else {
            tracing::warn!(
                http.method = %self.method,
                route.pattern = %self.path,
                "route captures more than one output contract, keeping the first"
            );
        }
    }

    fn fail(&mut self, error: HestiaError) {
        self.error.get_or_insert(error);
    }

    fn seal(self, handler: ErasedHandler) -> HestiaResult<RegistrationHandle> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let pattern = PathPattern::parse(&self.path)?;

        if let Some(shape) = self
            .inputs
            .get(InputSource::Param)
            .and_then(|contract| contract.shape().as_object())
        {
            if let Some(param) = shape.names().find(|name| !pattern.declares(name)) {
                return Err(HestiaError::UndeclaredPathParam {
                    param: param.to_string(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        let handle = self.registry.register(RouteDefinition {
            method: self.method,
            pattern,
            inputs: self.inputs,
            output: self.output,
            description: self.description,
            handler,
        });

        tracing::debug!(route = %handle, "route registered");
        Ok(handle)
    }
}

impl fmt::Debug for RouteBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
