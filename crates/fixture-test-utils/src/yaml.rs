//! YAML loading helpers for assertions.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

/// Parse the YAML file at `path`.
///
/// # Panics
/// Panics if the file cannot be read or parsed.
pub fn load_yaml(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("load_yaml: cannot read {}: {e}", path.display()));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("load_yaml: cannot parse {}: {e}", path.display()))
}

/// Look up a nested value by key path.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// The string `field` of every entry of the list at `path`, in order.
pub fn list_field(value: &Value, path: &[&str], field: &str) -> Vec<String> {
    lookup(value, path)
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(field).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Every string in the list at `path`, in order.
pub fn string_list(value: &Value, path: &[&str]) -> Vec<String> {
    lookup(value, path)
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
