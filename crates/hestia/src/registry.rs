//! The route registry.

use std::sync::Arc;

use hestia_router::Params;
use http::Method;

use crate::route::{Registration, RegistrationHandle, RouteBuilder, RouteDefinition, RouteOptions};

/// Ordered store of sealed registrations.
///
/// The registry is plain owned data: routes are added through `&mut self`
/// during setup and read through `&self` afterwards, so registering while
/// requests are dispatched or the manifest is built does not compile.
/// Registrations are never deduplicated; two routes on the same method and
/// path are both kept, and lookups return the first.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Arc<Registration>>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a route on this registry with ambiguous output captures
    /// rejected.
    pub fn route(&mut self, method: Method, path: impl Into<String>) -> RouteBuilder<'_> {
        RouteBuilder::new(self, RouteOptions::default(), method, path)
    }

    pub(crate) fn register(&mut self, definition: RouteDefinition) -> RegistrationHandle {
        let handle = RegistrationHandle(self.routes.len());
        self.routes.push(Arc::new(Registration::new(handle, definition)));
        handle
    }

    /// Iterates registrations in registration order.
    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.routes.iter().map(AsRef::as_ref)
    }

    /// Looks up a registration by handle.
    #[must_use]
    pub fn get(&self, handle: RegistrationHandle) -> Option<&Registration> {
        self.routes.get(handle.0).map(AsRef::as_ref)
    }

    /// Number of registrations, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the first registration whose method and pattern match.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Registration, Params)> {
        self.registrations()
            .filter(|registration| registration.method() == method)
            .find_map(|registration| {
                registration
                    .pattern()
                    .matches(path)
                    .map(|params| (registration, params))
            })
    }
}
