//! Keyed child collections for each level of the store tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// The children of one tree node, ordered by key.
///
/// Keys are kept as the strings the store uses (`"2025"`, `"5"`, `"21"`,
/// push ids for records). Ordering is lexicographic; callers that need
/// numeric ordering parse the keys themselves.
///
/// Deserializes from either a JSON object or a JSON array. Firebase turns
/// nodes whose keys are small sequential integers into arrays, so a month
/// with days `1..=3` may arrive as `[null, {...}, {...}, {...}]`. Array
/// indices become keys and `null` entries are dropped in both encodings.
/// A child that does not decode as `T` (a stray scalar next to records, say)
/// is logged and dropped; only a non-container node itself is an error.
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Children<T>(BTreeMap<String, T>);

impl<T> Children<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up a child by key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.get(key)
    }

    /// Insert or replace a child.
    pub fn insert(&mut self, key: impl Into<String>, child: T) -> Option<T> {
        self.0.insert(key.into(), child)
    }

    /// Get a child, inserting `T::default()` first if it is missing.
    pub fn entry_or_default(&mut self, key: impl Into<String>) -> &mut T
    where
        T: Default,
    {
        self.0.entry(key.into()).or_default()
    }

    /// Iterate over `(key, child)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.0.iter()
    }

    /// Iterate over keys in key order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Iterate over children in key order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for Children<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de, T> Deserialize<'de> for Children<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(String, Value)> = match Value::deserialize(deserializer)? {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, child)| (index.to_string(), child))
                .collect(),
            other => {
                return Err(D::Error::custom(format!(
                    "expected an object or array of children, found {}",
                    kind(&other)
                )))
            }
        };

        // A child of the wrong shape is dropped so its siblings still count
        let children = entries
            .into_iter()
            .filter(|(_, child)| !child.is_null())
            .filter_map(|(key, child)| {
                let found = kind(&child);
                match T::deserialize(child) {
                    Ok(decoded) => Some((key, decoded)),
                    Err(e) => {
                        warn!(key = %key, "Skipping {} child: {}", found, e);
                        None
                    }
                }
            })
            .collect();

        Ok(Self(children))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
