//! A string-keyed map that ignores ASCII case.

use std::collections::HashMap;

/// Map keyed by strings compared without regard to ASCII case.
///
/// The first spelling of a key is kept; inserting under another spelling
/// replaces the value.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseInsensitiveMap<V> {
    entries: HashMap<String, (String, V)>,
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> CaseInsensitiveMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.get_mut(&key.to_ascii_lowercase()) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value)),
            None => {
                self.entries.insert(key.to_ascii_lowercase(), (key, value));
                None
            }
        }
    }

    /// Looks up `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries with their original key spelling, in no order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Consumes the map, yielding its values.
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.entries.into_values().map(|(_, value)| value)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
