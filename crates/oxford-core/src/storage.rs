#![forbid(unsafe_code)]

//! Key-value storage backends.
//!
//! The desktop persists two JSON blobs: chat history in session-scoped
//! storage and mail read-state in persistent storage. Both are read once with
//! defensive defaulting and rewritten in full on every mutation. Failures are
//! logged and swallowed so the desktop keeps running on in-memory state.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },
    #[error("stored value for {key} is not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store, the shape of `sessionStorage` / `localStorage`.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend. Hosts mirror it into browser storage; tests use it
/// directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    unavailable: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total stored bytes past `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// A backend whose every call fails, like storage in a locked-down
    /// browser profile.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Snapshot of all stored pairs.
    #[must_use]
    pub fn items(&self) -> &BTreeMap<String, String> {
        &self.items
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = self.quota_bytes
            && self.used_bytes_without(key) + key.len() + value.len() > quota
        {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.items.remove(key);
        Ok(())
    }
}

/// Read and decode a JSON blob. `Ok(None)` when the key is absent or empty.
pub fn load_json<T: DeserializeOwned>(
    backend: &dyn StorageBackend,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = backend.get_item(key)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Encode and write a JSON blob in full.
pub fn save_json<T: Serialize>(
    backend: &mut dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    backend.set_item(key, raw)
}

/// [`load_json`] that logs failures and falls back to `None`.
pub fn load_or_warn<T: DeserializeOwned>(backend: &dyn StorageBackend, key: &str) -> Option<T> {
    match load_json(backend, key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "failed to load persisted state");
            None
        }
    }
}

/// [`save_json`] that logs failures and carries on.
pub fn save_or_warn<T: Serialize>(backend: &mut dyn StorageBackend, key: &str, value: &T) -> bool {
    match save_json(backend, key, value) {
        Ok(()) => true,
        Err(err) => {
            warn!(key, error = %err, "failed to save persisted state");
            false
        }
    }
}
