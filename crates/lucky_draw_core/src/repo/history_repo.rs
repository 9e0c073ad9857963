//! Append-only draw history ledger.
//!
//! # Responsibility
//! - Load, append to, replace and clear the persisted `SpinHistory`.
//!
//! # Invariants
//! - `append` is a read-modify-write with last-writer-wins semantics; it
//!   assumes a single writer per storage key.
//! - `append` never writes when the backend read failed, so a transient
//!   read error cannot replace the ledger with a fresh one.
//! - `created_at` is written once when the ledger is initialized.
//! - `updated_at` strictly increases across appends, bumped by 1 ms when the
//!   clock has not advanced past the previous value.

use super::{format_timestamp, system_clock, Clock, HISTORY_KEY};
use crate::model::spin::{SpinHistory, SpinRecord};
use crate::store::{KeyValueStore, PersistedStore, StorageError};
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};

/// Ledger view over the `lucky_spin_history` key.
pub struct HistoryLedger<'a, S: KeyValueStore> {
    store: &'a PersistedStore<S>,
    clock: Clock,
}

impl<'a, S: KeyValueStore> HistoryLedger<'a, S> {
    pub fn new(store: &'a PersistedStore<S>) -> Self {
        Self::with_clock(store, system_clock)
    }

    pub fn with_clock(store: &'a PersistedStore<S>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Returns the persisted history, or `None` when never initialized or unparsable.
    pub fn load(&self) -> Option<SpinHistory> {
        self.store.get_json(HISTORY_KEY)
    }

    /// Appends one draw and persists the updated ledger.
    ///
    /// Fails without writing when the current ledger cannot be read. A missing
    /// or unparsable ledger starts a fresh history.
    pub fn append(
        &self,
        number: i64,
        min_range: i64,
        max_range: i64,
    ) -> Result<SpinRecord, StorageError> {
        let now = (self.clock)();
        let current = self.store.try_get_json::<SpinHistory>(HISTORY_KEY)?;
        let (mut history, stamped_at) = match current {
            Some(history) => {
                let stamped_at = next_stamp(&history.updated_at, now);
                (history, stamped_at)
            }
            None => (
                SpinHistory::new(min_range, max_range, format_timestamp(now)),
                now,
            ),
        };

        let stamp = format_timestamp(stamped_at);
        let record = SpinRecord::new(number, min_range, max_range, stamp.clone());
        history.records.push(record.clone());
        history.min_range = min_range;
        history.max_range = max_range;
        history.updated_at = stamp;

        self.store.set_json(HISTORY_KEY, &history)?;
        info!(
            "event=history_append module=repo status=ok number={number} min={min_range} max={max_range} count={}",
            history.len()
        );
        Ok(record)
    }

    /// Overwrites the ledger wholesale (import path).
    pub fn replace(&self, history: &SpinHistory) -> Result<(), StorageError> {
        self.store.set_json(HISTORY_KEY, history)?;
        info!(
            "event=history_replace module=repo status=ok count={}",
            history.len()
        );
        Ok(())
    }

    /// Deletes the ledger. Idempotent.
    pub fn clear(&self) {
        self.store.remove(HISTORY_KEY);
        debug!("event=history_clear module=repo status=ok");
    }

    /// Number of records, 0 when absent.
    pub fn count(&self) -> usize {
        self.load().map_or(0, |history| history.len())
    }

    /// Most recently drawn number, used to restore the display on reload.
    pub fn last_number(&self) -> Option<i64> {
        self.load().and_then(|history| history.last_number())
    }
}

fn next_stamp(previous: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(previous) {
        Ok(previous) => {
            let previous = previous.with_timezone(&Utc);
            if now > previous {
                now
            } else {
                previous + TimeDelta::milliseconds(1)
            }
        }
        Err(_) => now,
    }
}

#[cfg(test)]
mod tests {
    use super::next_stamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn next_stamp_bumps_when_clock_stalls() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bumped = next_stamp("2024-01-01T00:00:00.000Z", now);
        assert_eq!(bumped.timestamp_millis(), now.timestamp_millis() + 1);
    }

    #[test]
    fn next_stamp_uses_clock_when_ahead_or_previous_unparsable() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(next_stamp("2024-01-01T00:00:00.000Z", now), now);
        assert_eq!(next_stamp("garbage", now), now);
    }
}
