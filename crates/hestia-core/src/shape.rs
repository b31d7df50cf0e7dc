//! Runtime shape descriptors.
//!
//! A [`Shape`] is the structural description of a value: which primitive it
//! is, or which fields an object carries. The same descriptor drives request
//! validation, string-source coercion, the merged input shape of a route and
//! the rendering of the application manifest.
//!
//! # Example
//!
//! ```
//! use hestia_core::Shape;
//! use serde_json::json;
//!
//! let user = Shape::object()
//!     .field("name", Shape::string())
//!     .optional("age", Shape::integer());
//!
//! assert!(user.validate(&json!({"name": "Ada"})).is_ok());
//! assert!(user.validate(&json!({"age": 36})).is_err());
//! assert_eq!(user.to_string(), "{ name: string; age?: integer }");
//! ```

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Structural description of a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Shape {
    /// Unconstrained: any value is accepted and nothing is known about it.
    #[default]
    Unknown,
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number representable as a 64-bit integer.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// JSON `null`.
    Null,
    /// A homogeneous array.
    Array(Box<Shape>),
    /// An object with named fields. Extra fields are tolerated.
    Object(ObjectShape),
}

impl Shape {
    /// Creates a string shape.
    #[must_use]
    pub const fn string() -> Self {
        Self::String
    }

    /// Creates a number shape.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number
    }

    /// Creates an integer shape.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer
    }

    /// Creates a boolean shape.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// Creates a null shape.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Creates an unconstrained shape.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::Unknown
    }

    /// Creates an array shape with the given item shape.
    #[must_use]
    pub fn array(item: Shape) -> Self {
        Self::Array(Box::new(item))
    }

    /// Creates an object shape with no fields.
    #[must_use]
    pub fn object() -> Self {
        Self::Object(ObjectShape::new())
    }

    /// Returns the shape a [`Describe`](crate::Describe) type declares.
    #[must_use]
    pub fn of<T: crate::Describe + ?Sized>() -> Self {
        T::shape()
    }

    /// Adds a required field.
    ///
    /// Adding a field to [`Shape::Unknown`] turns it into an object; other
    /// non-object shapes are returned unchanged.
    #[must_use]
    pub fn field(self, name: impl Into<String>, shape: Shape) -> Self {
        self.with_field(name.into(), Field::required(shape))
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, shape: Shape) -> Self {
        self.with_field(name.into(), Field::optional(shape))
    }

    fn with_field(self, name: String, field: Field) -> Self {
        let mut object = match self {
            Self::Object(object) => object,
            Self::Unknown => ObjectShape::new(),
            other => return other,
        };
        object.insert(name, field);
        Self::Object(object)
    }

    /// Returns `true` for [`Shape::Unknown`].
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the object fields if this is an object shape.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the declared field names of an object shape, in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.as_object()
            .map(|object| object.names().collect())
            .unwrap_or_default()
    }

    /// Returns the descriptor name used in manifests and error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Validates a value, returning the first mismatch found.
    ///
    /// Object fields are checked in declaration order and array items in
    /// index order, so the reported mismatch is deterministic.
    pub fn validate(&self, value: &Value) -> Result<(), ShapeMismatch> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), ShapeMismatch> {
        let matches = match self {
            Self::Unknown => true,
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
            Self::Array(item) => {
                let Some(items) = value.as_array() else {
                    return Err(ShapeMismatch::expected(path, self, value));
                };
                for (idx, item_value) in items.iter().enumerate() {
                    item.validate_at(item_value, &format!("{path}[{idx}]"))?;
                }
                true
            }
            Self::Object(object) => {
                let Some(map) = value.as_object() else {
                    return Err(ShapeMismatch::expected(path, self, value));
                };
                object.validate_fields_at(map, path)?;
                true
            }
        };

        if matches {
            Ok(())
        } else {
            Err(ShapeMismatch::expected(path, self, value))
        }
    }

    /// Converts string leaves to the primitive this shape declares.
    ///
    /// Path, query, form, header and cookie values always arrive as strings.
    /// `"42"` becomes `42` for integer and number shapes, `"true"`/`"false"`
    /// become booleans, and a lone value becomes a one-element array for
    /// array shapes. Anything that cannot be converted is returned untouched
    /// so that [`validate`](Self::validate) reports it.
    #[must_use]
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (Self::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            (Self::Number, Value::String(s)) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else {
                    match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                        Some(n) => Value::Number(n),
                        None => Value::String(s),
                    }
                }
            }
            (Self::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(s),
            },
            (Self::Array(item), Value::Array(items)) => {
                Value::Array(items.into_iter().map(|v| item.coerce(v)).collect())
            }
            (Self::Array(item), value) if !value.is_null() => Value::Array(vec![item.coerce(value)]),
            (Self::Object(object), Value::Object(mut map)) => {
                object.coerce_fields(&mut map);
                Value::Object(map)
            }
            (_, value) => value,
        }
    }

    /// Shallow union of two shapes by field name; `other` wins on conflicts.
    ///
    /// [`Shape::Unknown`] is the identity on either side. Merging anything
    /// that is not a pair of objects yields `other`.
    #[must_use]
    pub fn merge(&self, other: &Shape) -> Shape {
        match (self, other) {
            (_, Self::Unknown) => self.clone(),
            (Self::Unknown, _) => other.clone(),
            (Self::Object(left), Self::Object(right)) => {
                let mut merged = left.clone();
                merged.extend_from(right);
                Self::Object(merged)
            }
            _ => other.clone(),
        }
    }

    fn from_descriptor(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(name) => match name.as_str() {
                "unknown" => Ok(Self::Unknown),
                "string" => Ok(Self::String),
                "number" => Ok(Self::Number),
                "integer" => Ok(Self::Integer),
                "boolean" => Ok(Self::Boolean),
                "null" => Ok(Self::Null),
                other => Err(format!("unknown shape descriptor '{other}'")),
            },
            Value::Array(items) if items.len() == 1 => {
                Ok(Self::array(Self::from_descriptor(&items[0])?))
            }
            Value::Array(items) => Err(format!(
                "array descriptor must hold exactly one item shape, got {}",
                items.len()
            )),
            Value::Object(map) => {
                let mut object = ObjectShape::new();
                for (key, descriptor) in map {
                    let shape = Self::from_descriptor(descriptor)?;
                    match key.strip_suffix('?') {
                        Some(name) => object.insert(name, Field::optional(shape)),
                        None => object.insert(key.as_str(), Field::required(shape)),
                    }
                }
                Ok(Self::Object(object))
            }
            other => Err(format!(
                "expected shape descriptor, got {}",
                value_type_name(other)
            )),
        }
    }
}

/// Field set of an object shape, in declaration order.
///
/// Equality ignores field order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    fields: IndexMap<String, Field>,
}

impl ObjectShape {
    /// Creates an object shape with no fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    /// Returns the field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns `true` if a field called `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Iterates over field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates an object's members against the declared fields.
    ///
    /// Same as [`Shape::validate`] on the object, without wrapping it in a
    /// [`Value`] first.
    pub fn validate_fields(&self, fields: &Map<String, Value>) -> Result<(), ShapeMismatch> {
        self.validate_fields_at(fields, "$")
    }

    fn validate_fields_at(
        &self,
        fields: &Map<String, Value>,
        path: &str,
    ) -> Result<(), ShapeMismatch> {
        for (name, field) in self.iter() {
            let field_path = format!("{path}.{name}");
            match fields.get(name) {
                None | Some(Value::Null) if field.is_optional() => {}
                None => return Err(ShapeMismatch::missing(&field_path)),
                Some(value) => field.shape().validate_at(value, &field_path)?,
            }
        }
        Ok(())
    }

    /// Coerces the declared members of an object in place.
    ///
    /// See [`Shape::coerce`].
    pub fn coerce_fields(&self, fields: &mut Map<String, Value>) {
        for (name, field) in self.iter() {
            if let Some(slot) = fields.get_mut(name) {
                *slot = field.shape().coerce(slot.take());
            }
        }
    }

    /// Copies every field of `other` into `self`, overwriting same-named ones.
    pub fn extend_from(&mut self, other: &ObjectShape) {
        for (name, field) in &other.fields {
            self.fields.insert(name.clone(), field.clone());
        }
    }
}

/// A named member of an [`ObjectShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    shape: Shape,
    optional: bool,
}

impl Field {
    /// A field that must be present.
    #[must_use]
    pub const fn required(shape: Shape) -> Self {
        Self {
            shape,
            optional: false,
        }
    }

    /// A field that may be absent or `null`.
    #[must_use]
    pub const fn optional(shape: Shape) -> Self {
        Self {
            shape,
            optional: true,
        }
    }

    /// Returns the field's shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns `true` if the field may be omitted.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }
}

/// The first place a value failed to satisfy a [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mismatch at '{path}': {message}")]
pub struct ShapeMismatch {
    /// JSON path of the offending value, rooted at `$`.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

impl ShapeMismatch {
    fn expected(path: &str, shape: &Shape, value: &Value) -> Self {
        Self {
            path: path.to_string(),
            message: format!(
                "expected {}, got {}",
                shape.type_name(),
                value_type_name(value)
            ),
        }
    }

    fn missing(path: &str) -> Self {
        Self {
            path: path.to_string(),
            message: "missing required field".to_string(),
        }
    }
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(item) => match item.as_ref() {
                Self::Array(_) | Self::Object(_) => write!(f, "Array<{item}>"),
                _ => write!(f, "{item}[]"),
            },
            Self::Object(object) if object.is_empty() => f.write_str("{}"),
            Self::Object(object) => {
                f.write_str("{ ")?;
                for (idx, (name, field)) in object.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    let marker = if field.is_optional() { "?" } else { "" };
                    write!(f, "{name}{marker}: {}", field.shape())?;
                }
                f.write_str(" }")
            }
            other => f.write_str(other.type_name()),
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Array(item) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(item.as_ref())?;
                seq.end()
            }
            Self::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (name, field) in object.iter() {
                    if field.is_optional() {
                        map.serialize_entry(&format!("{name}?"), field.shape())?;
                    } else {
                        map.serialize_entry(name, field.shape())?;
                    }
                }
                map.end()
            }
            other => serializer.serialize_str(other.type_name()),
        }
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptor = Value::deserialize(deserializer)?;
        Self::from_descriptor(&descriptor).map_err(de::Error::custom)
    }
}
