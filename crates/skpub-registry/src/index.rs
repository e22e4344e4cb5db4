//! The decoded `plugins.json` registry file.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::{PluginEntry, RegistryError, RegistryResult};

/// Ordered registry entries.
///
/// Existing entries are kept as raw JSON so fields this crate does not
/// model are written back untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryIndex {
    entries: Vec<Value>,
}

impl RegistryIndex {
    /// Parses the JSON text of the registry file.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON array.
    pub fn from_json(text: &str) -> RegistryResult<Self> {
        match serde_json::from_str(text).map_err(RegistryError::InvalidIndex)? {
            Value::Array(entries) => Ok(Self { entries }),
            _ => Err(RegistryError::NotAnArray),
        }
    }

    /// Decodes file content as returned by the contents API.
    ///
    /// GitHub wraps base64 content at 60 columns; whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not base64-encoded UTF-8 JSON.
    pub fn from_base64(content: &str) -> RegistryResult<Self> {
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        Self::from_json(&String::from_utf8(bytes)?)
    }

    /// Returns the entries in registry order.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry whose `title` equals `title` or whose `name` equals
    /// `name`.
    #[must_use]
    pub fn find_existing(&self, title: &str, name: &str) -> Option<&Value> {
        self.entries.iter().find(|entry| {
            let field = |key: &str| entry.get(key).and_then(Value::as_str);
            field("title") == Some(title) || field("name") == Some(name)
        })
    }

    /// Appends an entry at the end of the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized.
    pub fn push(&mut self, entry: &PluginEntry) -> RegistryResult<()> {
        let value = serde_json::to_value(entry).map_err(RegistryError::Serialize)?;
        self.entries.push(value);
        Ok(())
    }

    /// Serializes the registry with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_pretty_json(&self) -> RegistryResult<String> {
        serde_json::to_string_pretty(&self.entries).map_err(RegistryError::Serialize)
    }

    /// Serializes and base64-encodes the registry for the contents API.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_base64(&self) -> RegistryResult<String> {
        Ok(STANDARD.encode(self.to_pretty_json()?))
    }
}
