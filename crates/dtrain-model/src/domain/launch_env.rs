use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Environment variables a launch publishes to every process it spawns.
///
/// Stored as an ordered list of key-value pairs; later entries override earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchEnv(pub Vec<KeyValue>);

impl LaunchEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Get the value for a key, returning the last matching entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    /// Append a key-value pair.
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Builder-style [`LaunchEnv::push`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.push(key, value);
        self
    }

    /// Merge two environments, entries from `other` win.
    pub fn merged(&self, other: &LaunchEnv) -> LaunchEnv {
        let mut out = self.0.clone();
        out.extend(other.0.clone());
        LaunchEnv(out)
    }

    /// Effective `(key, value)` pairs: one per key, last write wins, first-seen order kept.
    pub fn resolved(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::with_capacity(self.0.len());
        for kv in &self.0 {
            match out.iter_mut().find(|(k, _)| *k == kv.key()) {
                Some(slot) => slot.1 = kv.value(),
                None => out.push((kv.key(), kv.value())),
            }
        }
        out
    }
}

impl Default for LaunchEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for LaunchEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}
