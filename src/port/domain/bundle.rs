//! Structured key-value payload carried by messages.

use super::PortDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single bundle value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BundleValue {
    /// UTF-8 string value.
    String(String),
    /// Ordered list of strings.
    StringArray(Vec<String>),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

/// Key-value container used as a message body.
///
/// Keys are kept in sorted order so that encoding is deterministic. The
/// message port never introspects bundle contents; it only encodes
/// outbound bundles and decodes inbound payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: BTreeMap<String, BundleValue>,
}

impl Bundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string entry and returns the bundle.
    #[must_use]
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, BundleValue::String(value.into()));
        self
    }

    /// Adds a string-array entry and returns the bundle.
    #[must_use]
    pub fn with_string_array<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collected = values.into_iter().map(Into::into).collect();
        self.insert(key, BundleValue::StringArray(collected));
        self
    }

    /// Adds a bytes entry and returns the bundle.
    #[must_use]
    pub fn with_bytes(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, BundleValue::Bytes(value.into()));
        self
    }

    /// Inserts a value, returning the previous value stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: BundleValue) -> Option<BundleValue> {
        self.entries.insert(key.into(), value)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<BundleValue> {
        self.entries.remove(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key)
    }

    /// Returns the string stored under `key`, if it is a string entry.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(BundleValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the bundle has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BundleValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Serializes the bundle into the bytes handed to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`PortDomainError::PayloadEncoding`] when serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, PortDomainError> {
        serde_json::to_vec(self).map_err(|err| PortDomainError::PayloadEncoding(err.to_string()))
    }

    /// Reconstructs a bundle from bytes delivered by the transport.
    ///
    /// # Errors
    ///
    /// Returns [`PortDomainError::PayloadDecoding`] when the bytes are not an
    /// encoded bundle.
    pub fn decode(raw: &[u8]) -> Result<Self, PortDomainError> {
        serde_json::from_slice(raw).map_err(|err| PortDomainError::PayloadDecoding(err.to_string()))
    }
}
