//! Persistent store adapter.
//!
//! The gate persists four string slots (registry, lock flag, last guest,
//! last credentials) in a flat key-value store. Backends implement
//! [`KeyValueStore`]; [`SlotStore`] layers the typed slots on top and
//! never lets a backend failure or a corrupt blob reach the caller:
//! reads degrade to empty/absent, writes are logged and dropped.

use crate::config::StoreKeys;
use crate::error::StoreError;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel written to the lock slot.
pub const LOCKED_SENTINEL: &str = "true";

/// A flat string key-value backend (`localStorage`, a JSON file, memory).
pub trait KeyValueStore {
    /// Read a key. A missing key is `Ok(None)`, never an error.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a key.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every key (the "clear site data" reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Raw (non-normalized) form input remembered for prefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastCredentials {
    pub name_raw: String,
    pub code_raw: String,
}

/// Typed access to the four gate slots over a backend.
#[derive(Debug)]
pub struct SlotStore<S> {
    backend: S,
    keys: StoreKeys,
}

impl<S: KeyValueStore> SlotStore<S> {
    /// Wrap a backend.
    pub fn new(backend: S, keys: StoreKeys) -> Self {
        Self { backend, keys }
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutably borrow the backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    // --- Raw slot access ---

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, treating slot as empty");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::warn!(key, error = %e, "store write failed");
        }
    }

    fn erase(&mut self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "store remove failed");
        }
    }

    // --- Registry ---

    /// Load the registry. Absent or corrupt blobs yield an empty registry.
    pub fn load_registry(&self) -> Registry {
        let Some(raw) = self.read(&self.keys.registry) else {
            return Registry::new();
        };
        match serde_json::from_str(&raw) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!(key = %self.keys.registry, error = %e, "corrupt registry, starting empty");
                Registry::new()
            }
        }
    }

    /// Serialize and write the whole registry.
    pub fn save_registry(&mut self, registry: &Registry) {
        match serde_json::to_string(registry) {
            Ok(raw) => {
                let key = self.keys.registry.clone();
                self.write(&key, &raw);
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize registry"),
        }
    }

    // --- Lock flag ---

    /// Whether the lock flag is set.
    pub fn is_locked(&self) -> bool {
        self.read(&self.keys.lock_flag).as_deref() == Some(LOCKED_SENTINEL)
    }

    /// Set the lock flag. There is no counterpart that clears it.
    pub fn set_locked(&mut self) {
        let key = self.keys.lock_flag.clone();
        self.write(&key, LOCKED_SENTINEL);
    }

    // --- Last guest ---

    /// Display name of the most recent successful guest.
    pub fn last_guest(&self) -> Option<String> {
        self.read(&self.keys.last_guest).filter(|name| !name.is_empty())
    }

    /// Remember the display name of a successful guest.
    pub fn set_last_guest(&mut self, display_name: &str) {
        let key = self.keys.last_guest.clone();
        self.write(&key, display_name);
    }

    /// Forget the last guest.
    pub fn clear_last_guest(&mut self) {
        let key = self.keys.last_guest.clone();
        self.erase(&key);
    }

    // --- Last credentials ---

    /// Remembered raw credentials. Absent or corrupt blobs yield `None`.
    pub fn last_credentials(&self) -> Option<LastCredentials> {
        let raw = self.read(&self.keys.last_credentials)?;
        match serde_json::from_str(&raw) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                tracing::warn!(key = %self.keys.last_credentials, error = %e, "corrupt credentials, ignoring");
                None
            }
        }
    }

    /// Remember raw credentials for prefill.
    pub fn set_last_credentials(&mut self, credentials: &LastCredentials) {
        match serde_json::to_string(credentials) {
            Ok(raw) => {
                let key = self.keys.last_credentials.clone();
                self.write(&key, &raw);
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize credentials"),
        }
    }
}
