//! Repositories over the persisted key-value store.
//!
//! # Responsibility
//! - Own the storage key naming scheme.
//! - Give each persisted concern (history, range, layout, background) a
//!   typed read/write surface built on `PersistedStore`.
//!
//! # Invariants
//! - Absent or corrupt payloads read as "fresh start", never as errors.
//! - Repositories hold no in-memory copy beyond a single call.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod background_repo;
pub mod history_repo;
pub mod layout_repo;
pub mod settings_repo;

/// Common prefix of every key written by the draw core.
pub const KEY_PREFIX: &str = "lucky_";
pub const HISTORY_KEY: &str = "lucky_spin_history";
pub const RANGE_SETTINGS_KEY: &str = "lucky_range_settings";
pub const CUSTOM_BACKGROUND_KEY: &str = "lucky_custom_background";
pub const ORIGINAL_BACKGROUND_KEY: &str = "lucky_original_background";
pub const DRAG_KEY_PREFIX: &str = "lucky_drag_";
pub const SCALE_KEY_PREFIX: &str = "lucky_scale_";

/// Time source injected into repositories that stamp records.
pub type Clock = fn() -> DateTime<Utc>;

pub(crate) fn system_clock() -> DateTime<Utc> {
    Utc::now()
}

/// Formats like `Date.prototype.toISOString`: millisecond precision, `Z` suffix.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
