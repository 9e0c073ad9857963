//! Inclusive draw ranges and their persisted settings.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lower bound used when nothing has been configured.
pub const DEFAULT_MIN: i64 = 1;
/// Upper bound used when nothing has been configured.
pub const DEFAULT_MAX: i64 = 999;

/// Rejected range where `max < min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRangeError {
    pub min: i64,
    pub max: i64,
}

impl Display for InvalidRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid range: max {} is lower than min {}",
            self.max, self.min
        )
    }
}

impl Error for InvalidRangeError {}

/// Validated inclusive integer interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawRange {
    min: i64,
    max: i64,
}

impl DrawRange {
    pub fn new(min: i64, max: i64) -> Result<Self, InvalidRangeError> {
        if max < min {
            return Err(InvalidRangeError { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of integers in the interval.
    pub fn span(&self) -> u128 {
        (i128::from(self.max) - i128::from(self.min) + 1) as u128
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for DrawRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
        }
    }
}

impl Display for DrawRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Persisted range preference, written whenever the user edits bounds.
///
/// `max_value` may be missing in older payloads; readers substitute the
/// configured default upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSettings {
    pub min_value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub saved_at: String,
}

impl RangeSettings {
    pub fn new(range: DrawRange, saved_at: impl Into<String>) -> Self {
        Self {
            min_value: range.min(),
            max_value: Some(range.max()),
            saved_at: saved_at.into(),
        }
    }

    /// Converts to a validated range, filling a missing max from `fallback_max`.
    pub fn to_range(&self, fallback_max: i64) -> Result<DrawRange, InvalidRangeError> {
        DrawRange::new(self.min_value, self.max_value.unwrap_or(fallback_max))
    }
}
