//! The route manifest.
//!
//! A manifest is the machine-readable description of every registered
//! route, keyed by lowercase method then path:
//!
//! ```json
//! {
//!   "get": {
//!     "/hello": { "input": "unknown", "output": { "json": { "message": "string" } } }
//!   }
//! }
//! ```
//!
//! Client generators read it to produce typed calls without running the
//! application.

use std::collections::BTreeMap;

use hestia_core::{CombinedInputShape, OutputContract};
use serde::{Deserialize, Serialize};

use crate::registry::RouteRegistry;
use crate::route::Registration;

/// The contract of one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Input shape per source; `"unknown"` when the route declares none.
    pub input: CombinedInputShape,

    /// Output contract; `"unknown"` when unconstrained.
    #[serde(with = "unknown_or")]
    pub output: Option<OutputContract>,

    /// Human summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Registration> for RouteManifest {
    fn from(registration: &Registration) -> Self {
        Self {
            input: registration.inputs().combined(),
            output: registration.output().cloned(),
            description: registration.description().map(str::to_string),
        }
    }
}

/// Every route's contract, keyed by method then path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    routes: BTreeMap<String, BTreeMap<String, RouteManifest>>,
}

impl Manifest {
    /// Returns the entry for a method and registered path pattern.
    ///
    /// The method is matched case-insensitively.
    #[must_use]
    pub fn get(&self, method: &str, path: &str) -> Option<&RouteManifest> {
        self.routes
            .get(&method.to_ascii_lowercase())
            .and_then(|paths| paths.get(path))
    }

    /// Iterates `(method, path, entry)` sorted by method then path.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &RouteManifest)> {
        self.routes.iter().flat_map(|(method, paths)| {
            paths
                .iter()
                .map(move |(path, entry)| (method.as_str(), path.as_str(), entry))
        })
    }

    /// Number of distinct `(method, path)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Serializes to indented JSON text.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Derives a [`Manifest`] from a registry.
///
/// Building only reads the registry, so it can be repeated and always yields
/// the same manifest for the same registrations. When several registrations
/// share a method and path the first one is recorded, matching the one
/// dispatch would reach.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Builds the manifest for every registration in `registry`.
    #[must_use]
    pub fn build(registry: &RouteRegistry) -> Manifest {
        let mut routes: BTreeMap<String, BTreeMap<String, RouteManifest>> = BTreeMap::new();

        for registration in registry.registrations() {
            routes
                .entry(registration.method().as_str().to_ascii_lowercase())
                .or_default()
                .entry(registration.path().to_string())
                .or_insert_with(|| RouteManifest::from(registration));
        }

        Manifest { routes }
    }
}

mod unknown_or {
    use hestia_core::OutputContract;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const UNKNOWN: &str = "unknown";

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        output: &Option<OutputContract>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match output {
            Some(contract) => contract.serialize(serializer),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OutputContract>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Marker(String),
            Contract(OutputContract),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Marker(marker) if marker == UNKNOWN => Ok(None),
            Repr::Marker(other) => Err(D::Error::custom(format!(
                "expected \"{UNKNOWN}\" or an output contract, got \"{other}\""
            ))),
            Repr::Contract(contract) => Ok(Some(contract)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_core::{Context, HestiaResult, InputContract, Reply, Shape};
    use http::Method;
    use serde_json::json;

    async fn ok(ctx: Context) -> HestiaResult<Reply> {
        Ok(ctx.text("ok"))
    }

    #[test]
    fn test_empty_registry_gives_empty_manifest() {
        let manifest = ManifestBuilder::build(&RouteRegistry::new());
        assert!(manifest.is_empty());
        assert_eq!(manifest.to_json().unwrap(), json!({}));
    }

    #[test]
    fn test_unconstrained_route_renders_unknown() {
        let mut registry = RouteRegistry::new();
        registry.route(Method::DELETE, "/post/:id").handler(ok).unwrap();

        let manifest = ManifestBuilder::build(&registry);
        assert_eq!(
            manifest.to_json().unwrap(),
            json!({"delete": {"/post/:id": {"input": "unknown", "output": "unknown"}}})
        );
    }

    #[test]
    fn test_inputs_keyed_by_source_with_description() {
        let mut registry = RouteRegistry::new();
        registry
            .route(Method::POST, "/posts")
            .input(InputContract::json(Shape::object().field("title", Shape::string())))
            .input(InputContract::query(Shape::object().optional("draft", Shape::boolean())))
            .output(OutputContract::text())
            .describe("Create a post")
            .handler(ok)
            .unwrap();

        let manifest = ManifestBuilder::build(&registry);
        assert_eq!(
            manifest.to_json().unwrap(),
            json!({"post": {"/posts": {
                "input": {"json": {"title": "string"}, "query": {"draft?": "boolean"}},
                "output": {"text": "string"},
                "description": "Create a post",
            }}})
        );
    }

    #[test]
    fn test_first_duplicate_is_recorded() {
        let mut registry = RouteRegistry::new();
        registry
            .route(Method::GET, "/a")
            .output(OutputContract::text())
            .handler(ok)
            .unwrap();
        registry
            .route(Method::GET, "/a")
            .input(InputContract::query(Shape::object()))
            .handler(ok)
            .unwrap();

        let manifest = ManifestBuilder::build(&registry);
        assert_eq!(manifest.len(), 1);

        let entry = manifest.get("GET", "/a").unwrap();
        assert!(entry.input.is_unconstrained());
        assert_eq!(entry.output, Some(OutputContract::text()));
    }

    #[test]
    fn test_build_is_idempotent_and_read_only() {
        let mut registry = RouteRegistry::new();
        registry.route(Method::GET, "/a").handler(ok).unwrap();
        registry.route(Method::POST, "/b").handler(ok).unwrap();

        let first = ManifestBuilder::build(&registry);
        let second = ManifestBuilder::build(&registry);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 2);

        let routes: Vec<_> = first.routes().map(|(m, p, _)| (m, p)).collect();
        assert_eq!(routes, vec![("get", "/a"), ("post", "/b")]);
    }

    #[test]
    fn test_manifest_deserializes_from_its_json() {
        let mut registry = RouteRegistry::new();
        registry
            .route(Method::GET, "/hello")
            .output(OutputContract::json(Shape::object().field("message", Shape::string())))
            .handler(ok)
            .unwrap();
        let manifest = ManifestBuilder::build(&registry);

        let text = manifest.to_json_pretty().unwrap();
        let back: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_bad_output_marker_rejected() {
        let result: Result<RouteManifest, _> =
            serde_json::from_value(json!({"input": "unknown", "output": "anything"}));
        assert!(result.is_err());
    }
}
