//! Untyped YAML documents with nested key-path access.
//!
//! Every configuration file a fixture writes (root config, deployment
//! descriptors, cluster definitions) is handled as a [`Document`]: an ordered
//! YAML mapping that callers edit by key path instead of through typed structs,
//! so unknown keys written by other parties survive a read-modify-write cycle.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// An ordered YAML mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Mapping);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a YAML value. Anything other than a mapping (including `null`, which
    /// is what an empty file parses to) becomes an empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Mapping(mapping) => Self(mapping),
            _ => Self::default(),
        }
    }

    /// Unwrap into a YAML value.
    pub fn into_value(self) -> Value {
        Value::Mapping(self.0)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a nested value.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_mapping()?.get(*key)?;
        }
        Some(current)
    }

    /// Look up a nested string value.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Set a nested value, creating (or replacing non-mapping) intermediate
    /// levels as needed. An empty path is ignored.
    pub fn set(&mut self, path: &[&str], value: impl Into<Value>) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut current = &mut self.0;
        for key in parents {
            let slot = current
                .entry(Value::from(*key))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if !slot.is_mapping() {
                *slot = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(mapping) = slot else {
                return;
            };
            current = mapping;
        }
        current.insert(Value::from(*last), value.into());
    }

    /// Remove a nested value, returning it if present.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut current = &mut self.0;
        for key in parents {
            current = current.get_mut(*key)?.as_mapping_mut()?;
        }
        current.remove(*last)
    }

    /// Clone the sequence at `path`; missing or non-sequence values yield an
    /// empty list.
    pub fn list(&self, path: &[&str]) -> Vec<Value> {
        self.get(path)
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default()
    }

    /// Edit the sequence at `path` in place; a missing or non-sequence value
    /// starts out as an empty list. The result is always written back.
    pub fn update_list(&mut self, path: &[&str], update: impl FnOnce(&mut Vec<Value>)) {
        let mut list = self.list(path);
        update(&mut list);
        self.set(path, Value::Sequence(list));
    }

    /// The string `field` of every mapping entry in the list at `path`, in order.
    /// Entries without that field are skipped.
    pub fn list_fields(&self, path: &[&str], field: &str) -> Vec<String> {
        self.list(path)
            .iter()
            .filter_map(|entry| entry.get(field).and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

impl From<Mapping> for Document {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

/// Build a single-key mapping such as `{path: apps}`.
pub fn entry(key: &str, value: impl Into<Value>) -> Value {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from(key), value.into());
    Value::Mapping(mapping)
}
