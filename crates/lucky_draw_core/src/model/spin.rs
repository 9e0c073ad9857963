//! Spin records and the persisted history ledger payload.
//!
//! # Invariants
//! - `records` keeps insertion order, which is draw order.
//! - `min_range`/`max_range` on the history mirror the range of the most
//!   recent append; each record keeps its own draw-time range.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One completed draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRecord {
    pub number: i64,
    /// RFC 3339 capture time.
    pub timestamp: String,
    /// Legacy duplicate of `timestamp`; only ever written by export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<serde_json::Value>,
    pub min_range: i64,
    pub max_range: i64,
}

impl SpinRecord {
    pub fn new(number: i64, min_range: i64, max_range: i64, timestamp: impl Into<String>) -> Self {
        Self {
            number,
            timestamp: timestamp.into(),
            date: None,
            min_range,
            max_range,
        }
    }
}

/// Persisted session history (the ledger payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinHistory {
    pub records: Vec<SpinRecord>,
    pub min_range: i64,
    pub max_range: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl SpinHistory {
    /// Creates an empty history stamped with `now`.
    pub fn new(min_range: i64, max_range: i64, now: impl Into<String>) -> Self {
        let now = now.into();
        Self {
            records: Vec::new(),
            min_range,
            max_range,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drawn numbers in draw order.
    pub fn numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.records.iter().map(|record| record.number)
    }

    pub fn last_number(&self) -> Option<i64> {
        self.records.last().map(|record| record.number)
    }

    /// Checks structural invariants of an externally supplied history.
    ///
    /// Every record must lie inside its own draw-time range, and a number may
    /// appear at most once per `(min_range, max_range)`.
    pub fn validate(&self) -> Result<(), HistoryValidationError> {
        if self.max_range < self.min_range {
            return Err(HistoryValidationError::InvertedRange {
                min: self.min_range,
                max: self.max_range,
            });
        }
        let mut seen = HashSet::with_capacity(self.records.len());
        for (index, record) in self.records.iter().enumerate() {
            if record.max_range < record.min_range {
                return Err(HistoryValidationError::InvertedRecordRange {
                    index,
                    min: record.min_range,
                    max: record.max_range,
                });
            }
            if !(record.min_range..=record.max_range).contains(&record.number) {
                return Err(HistoryValidationError::NumberOutOfRange {
                    index,
                    number: record.number,
                    min: record.min_range,
                    max: record.max_range,
                });
            }
            if !seen.insert((record.min_range, record.max_range, record.number)) {
                return Err(HistoryValidationError::DuplicateNumber {
                    index,
                    number: record.number,
                });
            }
        }
        Ok(())
    }
}

/// Structural problem found in an imported history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryValidationError {
    InvertedRange { min: i64, max: i64 },
    InvertedRecordRange { index: usize, min: i64, max: i64 },
    NumberOutOfRange { index: usize, number: i64, min: i64, max: i64 },
    /// Same number drawn twice under one range.
    DuplicateNumber { index: usize, number: i64 },
}

impl Display for HistoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedRange { min, max } => {
                write!(f, "history range max {max} is lower than min {min}")
            }
            Self::InvertedRecordRange { index, min, max } => write!(
                f,
                "record #{} range max {max} is lower than min {min}",
                index + 1
            ),
            Self::NumberOutOfRange {
                index,
                number,
                min,
                max,
            } => write!(
                f,
                "record #{} number {number} is outside its range [{min}, {max}]",
                index + 1
            ),
            Self::DuplicateNumber { index, number } => write!(
                f,
                "record #{} repeats number {number} within the same range",
                index + 1
            ),
        }
    }
}

impl Error for HistoryValidationError {}

/// Three slot digits for a drawn number; `None` renders as `000`.
///
/// Numbers wider than three digits show their last three digits; negative
/// numbers use their absolute value.
pub fn slot_digits(number: Option<i64>) -> [u8; 3] {
    let value = number.map_or(0, |n| n.unsigned_abs() % 1000);
    [
        (value / 100) as u8,
        ((value / 10) % 10) as u8,
        (value % 10) as u8,
    ]
}
