//! Failure-tolerant typed accessor over a `KeyValueStore`.
//!
//! # Responsibility
//! - Convert every backend failure into "absent" (reads) or a logged no-op
//!   (writes/removes) so nothing raises past this boundary.
//! - Provide JSON (de)serialization helpers for typed payloads.
//!
//! # Invariants
//! - `get`/`get_json` never fail; malformed payloads read as `None`.
//! - `try_get_json` is the one read that reports backend failures, for
//!   read-modify-write callers that must not mistake them for absence.
//! - `set` failures are logged before being returned; callers may ignore them.

use super::{KeyValueStore, StoreError};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Write-side failure surfaced by `PersistedStore::set`.
#[derive(Debug)]
pub enum StorageError {
    Store(StoreError),
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize payload: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<StoreError> for StorageError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Typed, never-raising view over an injected storage backend.
#[derive(Debug)]
pub struct PersistedStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> PersistedStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Reads a raw value; any backend failure reads as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=store_get module=store status=degraded key={key} error={err}");
                None
            }
        }
    }

    /// Writes a raw value. Failures are logged and returned.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set(key, value).map_err(|err| {
            warn!(
                "event=store_set module=store status=error key={key} bytes={} error={err}",
                value.len()
            );
            StorageError::Store(err)
        })
    }

    /// Removes a key. Failures are logged and swallowed.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            warn!("event=store_remove module=store status=error key={key} error={err}");
        }
    }

    /// Reads and deserializes a JSON payload.
    ///
    /// Returns `None` when the key is absent, storage fails, or the payload
    /// does not match `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        self.decode(key, &raw)
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, raw: &str) -> Option<T> {
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=store_decode module=store status=corrupt key={key} bytes={} error={err}",
                    raw.len()
                );
                None
            }
        }
    }

    /// Like `get_json`, but a backend read failure is returned instead of
    /// reading as absent. Malformed payloads still read as `None`.
    pub fn try_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("event=store_get module=store status=error key={key} error={err}");
                return Err(StorageError::Store(err));
            }
        };
        Ok(self.decode(key, &raw))
    }

    /// Serializes `value` as JSON and writes it.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|err| {
            warn!("event=store_encode module=store status=error key={key} error={err}");
            StorageError::Serialize(err)
        })?;
        self.set(key, &raw)
    }

    /// Removes every key starting with `prefix`; returns how many were removed.
    ///
    /// Listing failures are logged and count as zero removals.
    pub fn remove_prefixed(&self, prefix: &str) -> usize {
        let keys = match self.backend.keys_with_prefix(prefix) {
            Ok(keys) => keys,
            Err(err) => {
                warn!("event=store_reset module=store status=error prefix={prefix} error={err}");
                return 0;
            }
        };
        for key in &keys {
            self.remove(key);
        }
        debug!(
            "event=store_reset module=store status=ok prefix={prefix} removed={}",
            keys.len()
        );
        keys.len()
    }
}
