//! Per-request typed state.
//!
//! Middleware-style code and handlers can stash values on the [`Context`]
//! under a string key and read them back with their concrete type.
//!
//! [`Context`]: crate::Context

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::{HestiaError, HestiaResult};

struct Entry {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// A string-keyed store of arbitrarily typed values.
///
/// # Example
///
/// ```
/// use hestia_core::StateStore;
///
/// let mut state = StateStore::new();
/// state.set("user_id", 42_u64);
///
/// assert_eq!(state.get::<u64>("user_id"), Some(&42));
/// assert!(state.get::<String>("user_id").is_none());
/// assert!(state.require::<String>("user_id").is_err());
/// ```
#[derive(Default)]
pub struct StateStore {
    entries: HashMap<String, Entry>,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores `value` under `key`, replacing any previous value of any type.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            Entry {
                value: Box::new(value),
                type_name: std::any::type_name::<T>(),
            },
        );
    }

    /// Returns the value under `key` if it holds a `T`.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.value.downcast_ref::<T>()
    }

    /// Returns a mutable reference to the value under `key` if it holds a `T`.
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.value.downcast_mut::<T>()
    }

    /// Returns the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::MissingState`] if nothing is stored under `key`
    /// and [`HestiaError::StateTypeMismatch`] if the stored value is not a `T`.
    pub fn require<T: 'static>(&self, key: &str) -> HestiaResult<&T> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| HestiaError::missing_state(key))?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| HestiaError::state_type_mismatch::<T>(key))
    }

    /// Removes and returns the value under `key` if it holds a `T`.
    ///
    /// A value of another type is left in place.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.value.is::<T>() {
            return None;
        }
        let entry = self.entries.remove(key)?;
        entry.value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Returns `true` if anything is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, entry) in &self.entries {
            map.entry(key, &entry.type_name);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Session {
        user: String,
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = StateStore::new();
        state.set("count", 1_u32);
        state.set("count", 2_u32);
        assert_eq!(state.get::<u32>("count"), Some(&2));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_overwrite_with_other_type() {
        let mut state = StateStore::new();
        state.set("value", 1_u32);
        state.set("value", "one".to_string());
        assert!(state.get::<u32>("value").is_none());
        assert_eq!(state.get::<String>("value").map(String::as_str), Some("one"));
    }

    #[test]
    fn test_require_errors() {
        let mut state = StateStore::new();
        state.set(
            "session",
            Session {
                user: "ada".to_string(),
            },
        );

        assert_eq!(state.require::<Session>("session").unwrap().user, "ada");
        assert!(matches!(
            state.require::<Session>("missing"),
            Err(HestiaError::MissingState { .. })
        ));
        assert!(matches!(
            state.require::<u8>("session"),
            Err(HestiaError::StateTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_checks_type() {
        let mut state = StateStore::new();
        state.set("count", 5_i64);

        assert_eq!(state.remove::<u8>("count"), None);
        assert!(state.contains("count"));
        assert_eq!(state.remove::<i64>("count"), Some(5));
        assert!(state.is_empty());
    }

    #[test]
    fn test_get_mut() {
        let mut state = StateStore::new();
        state.set("hits", vec![1_u8]);
        state.get_mut::<Vec<u8>>("hits").unwrap().push(2);
        assert_eq!(state.get::<Vec<u8>>("hits"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_debug_lists_type_names() {
        let mut state = StateStore::new();
        state.set("count", 1_u32);
        assert!(format!("{state:?}").contains("u32"));
    }
}
