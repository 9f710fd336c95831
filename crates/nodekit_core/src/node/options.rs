//! Node options record and shallow merge rules.
//!
//! # Responsibility
//! - Hold the arbitrary configuration knobs of one node declaration.
//! - Merge author defaults with per-resolution overrides.
//!
//! # Invariants
//! - Merging is shallow: top-level keys only, nested objects are replaced
//!   wholesale and never merged recursively.
//! - Merging never mutates either input.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Arbitrary user-defined options record (a JSON object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an options record from a JSON object literal.
    ///
    /// # Errors
    /// - `InvalidJson` when the input is not valid JSON.
    /// - `NotAnObject` when the input parses to a non-object value.
    pub fn from_json_str(raw: &str) -> Result<Self, OptionsError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| OptionsError::InvalidJson(err.to_string()))?;
        Self::from_value(value)
    }

    /// Converts a JSON value into an options record.
    pub fn from_value(value: Value) -> Result<Self, OptionsError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(OptionsError::NotAnObject),
        }
    }

    /// Shallow-merges `overrides` onto `defaults`.
    ///
    /// Keys present in `overrides` replace the default value entirely.
    pub fn merged(defaults: &Options, overrides: &Options) -> Options {
        let mut merged = defaults.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        Options(merged)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the record into a caller-defined typed options struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, OptionsError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|err| OptionsError::Deserialize(err.to_string()))
    }
}

/// Options parse/decode errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    NotAnObject,
    InvalidJson(String),
    Deserialize(String),
}

impl Display for OptionsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "options must be a JSON object"),
            Self::InvalidJson(value) => write!(f, "options are not valid JSON: {value}"),
            Self::Deserialize(value) => write!(f, "options do not match expected shape: {value}"),
        }
    }
}

impl Error for OptionsError {}
