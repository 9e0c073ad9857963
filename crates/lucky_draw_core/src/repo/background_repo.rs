//! Custom background image storage.
//!
//! Values are opaque encoded image strings (typically data URLs), stored
//! verbatim rather than as JSON.

use super::{CUSTOM_BACKGROUND_KEY, ORIGINAL_BACKGROUND_KEY};
use crate::store::{KeyValueStore, PersistedStore, StorageError};

pub struct BackgroundRepository<'a, S: KeyValueStore> {
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStore> BackgroundRepository<'a, S> {
    pub fn new(store: &'a PersistedStore<S>) -> Self {
        Self { store }
    }

    /// Image currently shown as background.
    pub fn custom(&self) -> Option<String> {
        self.store.get(CUSTOM_BACKGROUND_KEY)
    }

    /// Unedited upload, kept so later edits start from full resolution.
    pub fn original(&self) -> Option<String> {
        self.store.get(ORIGINAL_BACKGROUND_KEY)
    }

    pub fn has_background(&self) -> bool {
        self.custom().is_some()
    }

    /// Stores a fresh upload as both original and displayed image.
    pub fn set_upload(&self, data: &str) -> Result<(), StorageError> {
        self.store.set(ORIGINAL_BACKGROUND_KEY, data)?;
        self.store.set(CUSTOM_BACKGROUND_KEY, data)
    }

    /// Replaces only the displayed image (after an edit).
    pub fn save_custom(&self, data: &str) -> Result<(), StorageError> {
        self.store.set(CUSTOM_BACKGROUND_KEY, data)
    }

    pub fn reset(&self) {
        self.store.remove(CUSTOM_BACKGROUND_KEY);
        self.store.remove(ORIGINAL_BACKGROUND_KEY);
    }
}
