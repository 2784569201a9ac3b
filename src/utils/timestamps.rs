use chrono::NaiveDateTime;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_ALT};

/// Parse an hourly local timestamp (`2024-01-01T13:00` or `2024-01-01 13:00:00`)
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_ALT))
        .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid timestamp: '{}'", value)))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an optional numeric cell; empty strings and NaN spellings are missing
pub fn parse_optional_f64(value: &str) -> Result<Option<f64>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid number: '{}'", value)))
}
