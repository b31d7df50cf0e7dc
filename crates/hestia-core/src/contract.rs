//! Input and output contracts.
//!
//! A route declares at most one [`InputContract`] per [`InputSource`]; the
//! set of them is an [`InputContracts`]. Its [`CombinedInputShape`] is what
//! the manifest publishes. An [`OutputContract`] records the shape of the
//! route's successful response when one was captured.
//!
//! # Example
//!
//! ```
//! use hestia_core::contract::{InputContract, InputContracts, InputSource};
//! use hestia_core::Shape;
//!
//! let mut contracts = InputContracts::new();
//! contracts.push(InputContract::param(Shape::object().field("id", Shape::string()))).unwrap();
//! contracts.push(InputContract::query(Shape::object().field("page", Shape::integer()))).unwrap();
//!
//! assert!(contracts.contains(InputSource::Query));
//! assert_eq!(contracts.combined().merged().field_names(), vec!["id", "page"]);
//! ```

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::describe::Describe;
use crate::error::{HestiaError, HestiaResult};
use crate::shape::{ObjectShape, Shape};

/// Where an input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Path parameters captured by the route pattern.
    Param,
    /// The URL query string.
    Query,
    /// A `application/x-www-form-urlencoded` body.
    Form,
    /// A JSON body.
    Json,
    /// Request headers, keyed by lowercase name.
    Header,
    /// Cookies from the `cookie` header.
    Cookie,
}

impl InputSource {
    /// Every source, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Param,
        Self::Query,
        Self::Form,
        Self::Json,
        Self::Header,
        Self::Cookie,
    ];

    /// Returns the lowercase name used in manifests and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Param => "param",
            Self::Query => "query",
            Self::Form => "form",
            Self::Json => "json",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }

    /// Returns `true` if every value from this source arrives as a string.
    ///
    /// String sources are coerced toward their declared shape before
    /// validation.
    #[must_use]
    pub const fn is_string_source(&self) -> bool {
        !matches!(self, Self::Json)
    }

    /// Returns `true` if the source is read from the request body.
    #[must_use]
    pub const fn is_body(&self) -> bool {
        matches!(self, Self::Form | Self::Json)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape a route accepts from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct InputContract {
    source: InputSource,
    shape: Shape,
}

impl InputContract {
    /// Creates a contract for an arbitrary source.
    ///
    /// Header field names are lowercased to match how headers are decoded.
    #[must_use]
    pub fn new(source: InputSource, shape: Shape) -> Self {
        let shape = match (source, shape) {
            (InputSource::Header, Shape::Object(object)) => {
                Shape::Object(lowercase_names(&object))
            }
            (_, shape) => shape,
        };
        Self { source, shape }
    }

    /// Creates a contract whose shape is taken from `T`.
    #[must_use]
    pub fn typed<T: Describe + ?Sized>(source: InputSource) -> Self {
        Self::new(source, T::shape())
    }

    /// Path parameter contract.
    #[must_use]
    pub fn param(shape: Shape) -> Self {
        Self::new(InputSource::Param, shape)
    }

    /// Query string contract.
    #[must_use]
    pub fn query(shape: Shape) -> Self {
        Self::new(InputSource::Query, shape)
    }

    /// Form body contract.
    #[must_use]
    pub fn form(shape: Shape) -> Self {
        Self::new(InputSource::Form, shape)
    }

    /// JSON body contract.
    #[must_use]
    pub fn json(shape: Shape) -> Self {
        Self::new(InputSource::Json, shape)
    }

    /// Header contract. Field names are matched case-insensitively.
    #[must_use]
    pub fn header(shape: Shape) -> Self {
        Self::new(InputSource::Header, shape)
    }

    /// Cookie contract.
    #[must_use]
    pub fn cookie(shape: Shape) -> Self {
        Self::new(InputSource::Cookie, shape)
    }

    /// Returns the source this contract reads.
    #[must_use]
    pub const fn source(&self) -> InputSource {
        self.source
    }

    /// Returns the declared shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }
}

fn lowercase_names(object: &ObjectShape) -> ObjectShape {
    let mut lowered = ObjectShape::new();
    for (name, field) in object.iter() {
        lowered.insert(name.to_ascii_lowercase(), field.clone());
    }
    lowered
}

/// The input contracts of one route, in attachment order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputContracts {
    contracts: Vec<InputContract>,
}

impl InputContracts {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contracts: Vec::new(),
        }
    }

    /// Attaches a contract.
    ///
    /// # Errors
    ///
    /// - [`HestiaError::InvalidInputShape`] if the shape is neither an object
    ///   nor unknown; every source decodes to an object
    /// - [`HestiaError::DuplicateSource`] if a contract for the same source
    ///   is already attached
    pub fn push(&mut self, contract: InputContract) -> HestiaResult<()> {
        if !matches!(contract.shape(), Shape::Object(_) | Shape::Unknown) {
            return Err(HestiaError::InvalidInputShape {
                input: contract.source(),
                shape: contract.shape().to_string(),
            });
        }
        if self.contains(contract.source()) {
            return Err(HestiaError::DuplicateSource(contract.source()));
        }
        self.contracts.push(contract);
        Ok(())
    }

    /// Returns the contract for `source`.
    #[must_use]
    pub fn get(&self, source: InputSource) -> Option<&InputContract> {
        self.contracts.iter().find(|c| c.source() == source)
    }

    /// Returns `true` if a contract for `source` is attached.
    #[must_use]
    pub fn contains(&self, source: InputSource) -> bool {
        self.get(source).is_some()
    }

    /// Iterates over contracts in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &InputContract> {
        self.contracts.iter()
    }

    /// Returns the number of attached contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns `true` if no contract is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Returns the per-source shapes as published in the manifest.
    #[must_use]
    pub fn combined(&self) -> CombinedInputShape {
        CombinedInputShape {
            sources: self
                .contracts
                .iter()
                .map(|c| (c.source(), c.shape().clone()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InputContracts {
    type Item = &'a InputContract;
    type IntoIter = std::slice::Iter<'a, InputContract>;

    fn into_iter(self) -> Self::IntoIter {
        self.contracts.iter()
    }
}

/// Everything a route accepts, keyed by source.
///
/// Serializes as `"unknown"` when the route declares no input and as
/// `{"param": {...}, "query": {...}}` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedInputShape {
    sources: IndexMap<InputSource, Shape>,
}

impl CombinedInputShape {
    /// Returns `true` when the route declared no input contract.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the shape declared for `source`.
    #[must_use]
    pub fn get(&self, source: InputSource) -> Option<&Shape> {
        self.sources.get(&source)
    }

    /// Iterates over `(source, shape)` pairs in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = (InputSource, &Shape)> {
        self.sources.iter().map(|(source, shape)| (*source, shape))
    }

    /// Returns the flat union of all sources by field name.
    ///
    /// Later-attached sources win on conflicting names. An unconstrained
    /// input yields [`Shape::Unknown`].
    #[must_use]
    pub fn merged(&self) -> Shape {
        self.sources
            .values()
            .fold(Shape::Unknown, |acc, shape| acc.merge(shape))
    }
}

impl Serialize for CombinedInputShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.sources.is_empty() {
            return serializer.serialize_str("unknown");
        }
        let mut map = serializer.serialize_map(Some(self.sources.len()))?;
        for (source, shape) in &self.sources {
            map.serialize_entry(source, shape)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CombinedInputShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Marker(String),
            Sources(IndexMap<InputSource, Shape>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Marker(marker) if marker == "unknown" => Ok(Self::default()),
            Repr::Marker(other) => Err(de::Error::custom(format!(
                "expected \"unknown\" or a source map, got \"{other}\""
            ))),
            Repr::Sources(sources) => Ok(Self { sources }),
        }
    }
}

/// How a response body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// `application/json`.
    Json,
    /// `text/plain`.
    Text,
}

impl OutputKind {
    /// Returns the lowercase name used in manifests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The captured shape of a route's successful response.
///
/// Serializes as `{"json": <shape>}` or `{"text": "string"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputContract {
    kind: OutputKind,
    shape: Shape,
}

impl OutputContract {
    /// A JSON response of the given shape.
    #[must_use]
    pub const fn json(shape: Shape) -> Self {
        Self {
            kind: OutputKind::Json,
            shape,
        }
    }

    /// A JSON response shaped like `T`.
    #[must_use]
    pub fn typed_json<T: Describe + ?Sized>() -> Self {
        Self::json(T::shape())
    }

    /// A plain-text response.
    #[must_use]
    pub const fn text() -> Self {
        Self {
            kind: OutputKind::Text,
            shape: Shape::String,
        }
    }

    /// Returns the response encoding.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Returns the response shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl Serialize for OutputContract {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.kind, &self.shape)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for OutputContract {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = IndexMap::<OutputKind, Shape>::deserialize(deserializer)?;
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((kind, shape)), None) => Ok(Self { kind, shape }),
            _ => Err(de::Error::custom(
                "output contract must have exactly one kind",
            )),
        }
    }
}
