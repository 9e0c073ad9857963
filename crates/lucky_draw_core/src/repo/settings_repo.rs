//! Persisted range settings.
//!
//! The saved settings are the single source of truth for the current range.
//! The ledger's own `min_range`/`max_range` are historical annotation and
//! are never read as a fallback.

use super::{format_timestamp, system_clock, Clock, RANGE_SETTINGS_KEY};
use crate::model::range::{DrawRange, RangeSettings};
use crate::store::{KeyValueStore, PersistedStore, StorageError};
use log::warn;

pub struct RangeSettingsRepository<'a, S: KeyValueStore> {
    store: &'a PersistedStore<S>,
    clock: Clock,
}

impl<'a, S: KeyValueStore> RangeSettingsRepository<'a, S> {
    pub fn new(store: &'a PersistedStore<S>) -> Self {
        Self::with_clock(store, system_clock)
    }

    pub fn with_clock(store: &'a PersistedStore<S>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn load(&self) -> Option<RangeSettings> {
        self.store.get_json(RANGE_SETTINGS_KEY)
    }

    pub fn save(&self, range: DrawRange) -> Result<RangeSettings, StorageError> {
        let settings = RangeSettings::new(range, format_timestamp((self.clock)()));
        self.store.set_json(RANGE_SETTINGS_KEY, &settings)?;
        Ok(settings)
    }

    /// Current range: saved settings when valid, otherwise `defaults`.
    pub fn resolve(&self, defaults: DrawRange) -> DrawRange {
        let Some(settings) = self.load() else {
            return defaults;
        };
        match settings.to_range(defaults.max()) {
            Ok(range) => range,
            Err(err) => {
                warn!("event=range_resolve module=repo status=fallback error={err}");
                defaults
            }
        }
    }
}
