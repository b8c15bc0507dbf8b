//! # Key/Value Stores
//!
//! [`Store`] is the isolated key/value view of a single source. [`Registry`]
//! is the merged result of every source and carries the merge operations the
//! aggregator applies in precedence order.
//!
//! Keys are dotted paths compared case-insensitively. Nested objects are
//! flattened into their leaves on insert, so `{"services": {"go": {"image":
//! "x"}}}` is stored as the single key `services.go.image`.

use crate::key::{KeyMode, fix_key_name};
use crate::value::string_form;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Isolated key/value store for one configuration source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    values: BTreeMap<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a decoded document.
    ///
    /// Only objects carry keys; any other root value yields an empty store.
    pub fn from_value(value: Value) -> Self {
        let mut store = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                store.set(&key, value);
            }
        }
        store
    }

    /// Set `key` to `value`, replacing anything previously stored at, above,
    /// or below that path.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let key = key.to_lowercase();
        self.clear_path(&key);
        self.insert_flattened(key, value.into());
    }

    /// Look up a key. A path that only exists as a prefix of deeper keys is
    /// reassembled into an object.
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = key.to_lowercase();
        if let Some(value) = self.values.get(&key) {
            return Some(value.clone());
        }

        let prefix = format!("{key}.");
        let mut nested = Map::new();
        for (child, value) in self.values.range(prefix.clone()..) {
            let Some(rest) = child.strip_prefix(&prefix) else {
                break;
            };
            insert_nested(&mut nested, rest, value.clone());
        }

        if nested.is_empty() {
            None
        } else {
            Some(Value::Object(nested))
        }
    }

    /// Plain string form of a key, empty when missing or not a scalar.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| string_form(&v)).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a single leaf key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(&key.to_lowercase())
    }

    /// Leaf keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn clear_path(&mut self, key: &str) {
        let mut ancestor = key;
        while let Some((parent, _)) = ancestor.rsplit_once('.') {
            self.values.remove(parent);
            ancestor = parent;
        }

        let prefix = format!("{key}.");
        self.values.retain(|k, _| !k.starts_with(&prefix));
        self.values.remove(key);
    }

    fn insert_flattened(&mut self, key: String, value: Value) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (child, value) in map {
                    self.insert_flattened(format!("{key}.{}", child.to_lowercase()), value);
                }
            }
            other => {
                self.values.insert(key, other);
            }
        }
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Store {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<K: AsRef<str>, V: Into<Value>> Extend<(K, V)> for Store {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key.as_ref(), value);
        }
    }
}

fn insert_nested(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_nested(child, rest, value);
            }
        }
    }
}

/// How keys are rewritten when a source is merged into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalize {
    pub mode: KeyMode,

    /// Also keep the original key when it differs from the normalized name.
    pub retain_original: bool,

    pub skip_null: bool,
}

/// The merged key/value store produced by initialization.
///
/// Owned by the caller and passed to the aggregator explicitly; nothing in
/// this crate keeps a process-wide registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    store: Store,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.store.set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.store.get_string(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.store.iter()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Copy every key of `source` as-is. Returns the number of keys written.
    ///
    /// Existing keys that export under the same variable name are dropped,
    /// so the latest write wins regardless of how each source spelled it.
    pub fn merge_verbatim(&mut self, source: &Store, mode: KeyMode) -> usize {
        for (key, value) in source.iter() {
            self.evict_aliases(&fix_key_name(key, mode), mode);
            self.store.set(key, value.clone());
        }
        source.len()
    }

    /// Copy every key of `source` under its normalized name.
    /// Returns the number of source keys merged.
    pub fn merge_normalized(&mut self, source: &Store, rule: Normalize) -> usize {
        let mut merged = 0;

        for (key, value) in source.iter() {
            if rule.skip_null && value.is_null() {
                continue;
            }

            let name = fix_key_name(key, rule.mode);
            self.evict_aliases(&name, rule.mode);
            if rule.retain_original && key.to_uppercase() != name {
                self.store.set(key, value.clone());
            }
            self.store.set(&name, value.clone());
            merged += 1;
        }

        merged
    }

    fn evict_aliases(&mut self, name: &str, mode: KeyMode) {
        let aliases: Vec<String> = self
            .store
            .keys()
            .filter(|key| fix_key_name(key, mode) == name)
            .map(str::to_string)
            .collect();

        for alias in aliases {
            self.store.remove(&alias);
        }
    }
}
