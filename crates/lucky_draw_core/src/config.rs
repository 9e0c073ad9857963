//! Runtime configuration for draw sessions.
//!
//! # Responsibility
//! - Load host configuration from a JSON file with per-field defaults.
//! - Validate values before any session is created from them.
//!
//! # Invariants
//! - A validated config always yields a valid default range and export offset.

use crate::logging::default_log_level;
use crate::model::range::{DrawRange, DEFAULT_MAX, DEFAULT_MIN};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuckyDrawConfig {
    /// Range used until the user saves one.
    pub default_min: i64,
    pub default_max: i64,
    /// Caller-side reveal animation delay.
    pub reveal_delay_ms: u64,
    /// UTC offset used to render CSV times.
    pub export_utc_offset_minutes: i32,
    pub log_level: String,
}

impl Default for LuckyDrawConfig {
    fn default() -> Self {
        Self {
            default_min: DEFAULT_MIN,
            default_max: DEFAULT_MAX,
            reveal_delay_ms: 2500,
            export_utc_offset_minutes: 0,
            log_level: default_log_level().to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl LuckyDrawConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        DrawRange::new(self.default_min, self.default_max)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.export_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "export_utc_offset_minutes {} is outside +/-{MAX_OFFSET_MINUTES}",
                self.export_utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Default range; falls back to `[1, 999]` for an unvalidated inverted config.
    pub fn default_range(&self) -> DrawRange {
        DrawRange::new(self.default_min, self.default_max).unwrap_or_default()
    }

    /// CSV time offset; falls back to UTC when out of range.
    pub fn export_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.export_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
