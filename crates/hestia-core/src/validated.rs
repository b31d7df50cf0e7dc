//! Validated request data.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::contract::InputSource;
use crate::error::{HestiaError, HestiaResult};

/// Input that passed every contract of its route.
///
/// Each source's decoded object is kept separately, alongside the shallow
/// union of all of them by field name in attachment order (later wins).
///
/// # Example
///
/// ```
/// use hestia_core::{InputSource, ValidatedData};
/// use serde_json::json;
///
/// let data = ValidatedData::empty()
///     .with_source(InputSource::Param, json!({"id": "7"}).as_object().unwrap().clone())
///     .with_source(InputSource::Query, json!({"page": 2}).as_object().unwrap().clone());
///
/// assert_eq!(data.get("id"), Some(&json!("7")));
/// assert_eq!(data.get("page"), Some(&json!(2)));
/// assert!(data.source(InputSource::Json).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedData {
    sources: IndexMap<InputSource, Map<String, Value>>,
    merged: Map<String, Value>,
}

impl ValidatedData {
    /// Data for a route that declares no input.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds the validated object of one source.
    #[must_use]
    pub fn with_source(mut self, source: InputSource, values: Map<String, Value>) -> Self {
        for (key, value) in &values {
            self.merged.insert(key.clone(), value.clone());
        }
        self.sources.insert(source, values);
        self
    }

    /// Returns the union of all sources.
    #[must_use]
    pub const fn merged(&self) -> &Map<String, Value> {
        &self.merged
    }

    /// Returns one merged field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.merged.get(field)
    }

    /// Returns the validated object of one source.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::UnknownSourceAccess`] if the route declared no
    /// contract for `source`.
    pub fn source(&self, source: InputSource) -> HestiaResult<&Map<String, Value>> {
        self.sources
            .get(&source)
            .ok_or(HestiaError::UnknownSourceAccess(source))
    }

    /// Returns `true` if the route declared a contract for `source`.
    #[must_use]
    pub fn has_source(&self, source: InputSource) -> bool {
        self.sources.contains_key(&source)
    }

    /// Iterates over the declared sources in attachment order.
    pub fn sources(&self) -> impl Iterator<Item = InputSource> + '_ {
        self.sources.keys().copied()
    }

    /// Returns `true` if no source was validated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Deserializes the merged data into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::Deserialize`] if the data does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> HestiaResult<T> {
        from_map(&self.merged)
    }

    /// Deserializes one source's data into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::UnknownSourceAccess`] for an undeclared source
    /// and [`HestiaError::Deserialize`] if the data does not fit `T`.
    pub fn deserialize_source<T: DeserializeOwned>(&self, source: InputSource) -> HestiaResult<T> {
        from_map(self.source(source)?)
    }
}

fn from_map<T: DeserializeOwned>(map: &Map<String, Value>) -> HestiaResult<T> {
    serde_json::from_value(Value::Object(map.clone())).map_err(|e| HestiaError::deserialize::<T>(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_later_source_wins_in_merge() {
        let data = ValidatedData::empty()
            .with_source(InputSource::Param, object(json!({"id": "7", "slug": "a"})))
            .with_source(InputSource::Json, object(json!({"id": 7})));

        assert_eq!(data.get("id"), Some(&json!(7)));
        assert_eq!(data.get("slug"), Some(&json!("a")));
        assert_eq!(data.source(InputSource::Param).unwrap()["id"], json!("7"));
        assert_eq!(
            data.sources().collect::<Vec<_>>(),
            vec![InputSource::Param, InputSource::Json]
        );
    }

    #[test]
    fn test_undeclared_source_access() {
        let data = ValidatedData::empty();
        assert!(data.is_empty());
        assert!(matches!(
            data.source(InputSource::Query),
            Err(HestiaError::UnknownSourceAccess(InputSource::Query))
        ));
    }

    #[test]
    fn test_typed_view() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Page {
            page: i64,
            q: Option<String>,
        }

        let data = ValidatedData::empty().with_source(InputSource::Query, object(json!({"page": 3})));
        let page: Page = data.deserialize().unwrap();
        assert_eq!(page, Page { page: 3, q: None });

        let page: Page = data.deserialize_source(InputSource::Query).unwrap();
        assert_eq!(page.page, 3);

        let err = data.deserialize::<Vec<String>>().unwrap_err();
        assert!(matches!(err, HestiaError::Deserialize { .. }));
    }
}
