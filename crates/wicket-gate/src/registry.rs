//! Code → guest binding registry.
//!
//! Loaded and saved as a single JSON object. The on-disk field names
//! (`name`, `usedAt`) match blobs written by the deployed widget; the
//! `boundName`/`boundAt` spellings are accepted on read.
//!
//! Only `name` is required. A missing, null or unparseable timestamp leaves
//! the binding intact with `bound_at: None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The guest a code is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Normalized name of the guest who first redeemed the code
    #[serde(rename = "name", alias = "boundName")]
    pub bound_name: String,

    /// When the binding was created, if the stored timestamp was readable
    #[serde(
        rename = "usedAt",
        alias = "boundAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub bound_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

impl RegistryEntry {
    /// Whether this entry belongs to the given normalized name.
    pub fn is_bound_to(&self, normalized_name: &str) -> bool {
        self.bound_name == normalized_name
    }
}

/// Mapping from activation code to its binding. One entry per code, never
/// removed by the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Create empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the binding for a normalized code.
    pub fn lookup(&self, code: &str) -> Option<&RegistryEntry> {
        self.entries.get(code)
    }

    /// Bind a code to a normalized name.
    ///
    /// The caller must already have checked that no conflicting binding
    /// exists. Returns the replaced entry, if there was one.
    pub fn bind(
        &mut self,
        code: &str,
        normalized_name: &str,
        at: DateTime<Utc>,
    ) -> Option<RegistryEntry> {
        self.entries.insert(
            code.to_string(),
            RegistryEntry {
                bound_name: normalized_name.to_string(),
                bound_at: Some(at),
            },
        )
    }

    /// All bindings, ordered by code.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(code, entry)| (code.as_str(), entry))
    }

    /// Number of bound codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
