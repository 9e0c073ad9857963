//! Durable key-value storage capability and its backends.
//!
//! # Responsibility
//! - Define the opaque `get/set/remove` contract the draw core persists through.
//! - Provide an in-memory fake and a SQLite-backed durable implementation.
//!
//! # Invariants
//! - Keys and values are opaque UTF-8 strings; backends never interpret them.
//! - Backends report failures as `StoreError`; recovery policy lives in
//!   `PersistedStore`, not here.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod migrations;
mod persisted;
mod sqlite;

pub use memory::MemoryStore;
pub use persisted::{PersistedStore, StorageError};
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level failure reported by a storage backend.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Storage is disabled or otherwise unreachable.
    Unavailable(String),
    /// Write rejected because the backend is full.
    QuotaExceeded { key: String },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::QuotaExceeded { key } => write!(f, "storage quota exceeded writing `{key}`"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-keyed storage capability.
///
/// Injected into every repository so the core never touches a
/// process-wide singleton.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// Lists stored keys starting with `prefix`, sorted ascending.
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}
