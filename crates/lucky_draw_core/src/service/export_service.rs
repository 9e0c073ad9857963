//! History export to downloadable JSON/CSV files, and JSON re-import.
//!
//! # Responsibility
//! - Render a ledger snapshot to pretty JSON or headered CSV bytes.
//! - Parse a previously exported JSON file back into a validated history.
//!
//! # Invariants
//! - Exporting an absent or empty ledger fails with `EmptyHistory` and has
//!   no side effects.
//! - CSV fields never contain the delimiter, so rows are written unquoted.

use crate::model::spin::{HistoryValidationError, SpinHistory};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EXPORT_FILE_STEM: &str = "lucky_spin_history";
pub const CSV_HEADER: [&str; 5] = ["Order", "From", "To", "Number", "Time"];
/// en-US style local time without the comma `toLocaleString` inserts.
const CSV_TIME_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// Nothing to export.
    EmptyHistory,
    Json(serde_json::Error),
    Csv(csv::Error),
    Io(std::io::Error),
    /// Imported payload parsed but violates history invariants.
    Invalid(HistoryValidationError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyHistory => write!(f, "no spin history to export"),
            Self::Json(err) => write!(f, "invalid history JSON: {err}"),
            Self::Csv(err) => write!(f, "failed to write CSV: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "invalid history: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyHistory => None,
            Self::Json(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<HistoryValidationError> for ExportError {
    fn from(value: HistoryValidationError) -> Self {
        Self::Invalid(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv;charset=utf-8",
        }
    }

    /// Parses `json` / `csv`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// `lucky_spin_history_<YYYY-MM-DD>.<ext>`
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{EXPORT_FILE_STEM}_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn non_empty(history: Option<&SpinHistory>) -> ExportResult<&SpinHistory> {
    match history {
        Some(history) if !history.is_empty() => Ok(history),
        _ => Err(ExportError::EmptyHistory),
    }
}

/// Pretty-printed ledger with every record's `date` set to its `timestamp`.
pub fn to_json(history: Option<&SpinHistory>) -> ExportResult<Vec<u8>> {
    let mut snapshot = non_empty(history)?.clone();
    for record in &mut snapshot.records {
        record.date = Some(serde_json::Value::String(record.timestamp.clone()));
    }
    Ok(serde_json::to_vec_pretty(&snapshot)?)
}

/// `Order,From,To,Number,Time` table, one row per record in draw order.
pub fn to_csv(history: Option<&SpinHistory>, offset: FixedOffset) -> ExportResult<Vec<u8>> {
    let history = non_empty(history)?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for (index, record) in history.records.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            record.min_range.to_string(),
            record.max_range.to_string(),
            record.number.to_string(),
            format_time(&record.timestamp, offset),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Renders an RFC 3339 timestamp at `offset`; unparsable input is passed
/// through with commas stripped.
pub fn format_time(timestamp: &str, offset: FixedOffset) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(at) => at.with_timezone(&offset).format(CSV_TIME_FORMAT).to_string(),
        Err(_) => timestamp.replace(',', " "),
    }
}

/// Parses an exported (or stored) history JSON document.
pub fn from_json(bytes: &[u8]) -> ExportResult<SpinHistory> {
    let history: SpinHistory = serde_json::from_slice(bytes)?;
    history.validate()?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, format_time, to_csv, ExportError, ExportFormat};
    use chrono::{FixedOffset, NaiveDate};

    #[test]
    fn file_names_carry_date_and_extension() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_file_name(ExportFormat::Json, date),
            "lucky_spin_history_2024-03-09.json"
        );
        assert_eq!(
            export_file_name(ExportFormat::Csv, date),
            "lucky_spin_history_2024-03-09.csv"
        );
    }

    #[test]
    fn format_time_applies_offset_and_twelve_hour_clock() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            format_time("2024-01-01T00:00:00Z", utc),
            "1/1/2024 12:00:00 AM"
        );
        let ict = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(
            format_time("2024-01-01T13:05:09.000Z", ict),
            "1/1/2024 8:05:09 PM"
        );
        assert_eq!(format_time("Jan 1, 2024", utc), "Jan 1  2024");
    }

    #[test]
    fn absent_history_is_empty_error() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(matches!(to_csv(None, utc), Err(ExportError::EmptyHistory)));
    }

    #[test]
    fn format_parse_is_case_insensitive() {
        assert_eq!(ExportFormat::parse(" CSV "), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("xml"), None);
    }
}
