//! Payload naming conventions.
//!
//! The envelope (`jsonrpc`, `id`, `method`, `error.code`, `error.message`) is
//! always written with the field names fixed by JSON-RPC 2.0. Only payload
//! members (`params`, `result`, `error.data`) are renamed. Rust types use
//! snake_case field names, so a convention describes how those names look on
//! the wire: [`DataConvention::to_wire`] renames outbound payload keys and
//! [`DataConvention::from_wire`] turns inbound keys back into snake_case.
//!
//! `SnakeCase` and `Preserve` never touch a payload. The other conventions
//! rename every object key, so two keys that land on the same name are
//! reported as a [`KeyCollision`] instead of one silently replacing the other.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Two payload keys renamed to the same member name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload keys {first:?} and {second:?} both rename to {renamed:?}")]
pub struct KeyCollision {
    pub first: String,
    pub second: String,
    pub renamed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataConvention {
    #[default]
    SnakeCase,
    CamelCase,
    PascalCase,
    KebabCase,
    /// Keys pass through untouched in both directions.
    Preserve,
}

impl DataConvention {
    /// Render a single member name in this convention.
    pub fn rename(&self, key: &str) -> String {
        let words = split_words(key);
        if words.is_empty() {
            return key.to_string();
        }
        match self {
            DataConvention::SnakeCase => join_lower(&words, '_'),
            DataConvention::KebabCase => join_lower(&words, '-'),
            DataConvention::CamelCase => {
                let mut out = words[0].to_lowercase();
                for word in &words[1..] {
                    out.push_str(&capitalize(word));
                }
                out
            }
            DataConvention::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
            DataConvention::Preserve => key.to_string(),
        }
    }

    /// Whether payloads pass through this convention unchanged
    pub fn is_identity(&self) -> bool {
        matches!(self, DataConvention::SnakeCase | DataConvention::Preserve)
    }

    /// Rename payload keys from snake_case into this convention.
    pub fn to_wire(&self, value: Value) -> Result<Value, KeyCollision> {
        if self.is_identity() {
            return Ok(value);
        }
        rename_keys(value, &|key| self.rename(key))
    }

    /// Rename payload keys from this convention back into snake_case.
    pub fn from_wire(&self, value: Value) -> Result<Value, KeyCollision> {
        if self.is_identity() {
            return Ok(value);
        }
        rename_keys(value, &|key| DataConvention::SnakeCase.rename(key))
    }
}

/// Default convention plus per-method overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodConventions {
    #[serde(default)]
    pub default: DataConvention,
    #[serde(default)]
    pub overrides: HashMap<String, DataConvention>,
}

impl MethodConventions {
    pub fn new(default: DataConvention) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>, convention: DataConvention) -> Self {
        self.overrides.insert(method.into(), convention);
        self
    }

    pub fn set(&mut self, method: impl Into<String>, convention: DataConvention) {
        self.overrides.insert(method.into(), convention);
    }

    pub fn for_method(&self, method: &str) -> DataConvention {
        self.overrides.get(method).copied().unwrap_or(self.default)
    }
}

fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Result<Value, KeyCollision> {
    match value {
        Value::Object(map) => {
            let mut renamed = Map::with_capacity(map.len());
            let mut origins: HashMap<String, String> = HashMap::with_capacity(map.len());
            for (key, value) in map {
                let new_key = rename(&key);
                if let Some(first) = origins.get(&new_key) {
                    return Err(KeyCollision {
                        first: first.clone(),
                        second: key,
                        renamed: new_key,
                    });
                }
                renamed.insert(new_key.clone(), rename_keys(value, rename)?);
                origins.insert(new_key, key);
            }
            Ok(Value::Object(renamed))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|v| rename_keys(v, rename))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

/// Split an identifier on `_`, `-`, spaces and case boundaries.
///
/// `HTTPServer` splits as `HTTP` / `Server`; digits stay with the preceding word.
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn join_lower(words: &[String], separator: char) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(&word.to_lowercase());
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
