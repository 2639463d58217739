//! Schedule date normalization.
//!
//! # Responsibility
//! - Parse loose `YYYY-MM-DD` strings into calendar dates.
//! - Absorb parse failures locally so callers only ever see `None`.
//!
//! # Invariants
//! - `normalize_date` never panics and never substitutes a fallback date
//!   (no "today", no epoch).
//! - A time suffix after the day component (`T...` or ` ...`) is ignored.

use chrono::NaiveDate;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a schedule date string cannot become a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Input is blank after trim.
    Empty,
    /// Input does not split into exactly three `-` separated components.
    Malformed(String),
    /// One component is not a decimal number.
    NonNumeric(String),
    /// Components are numeric but do not name a real calendar day.
    OutOfRange(String),
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "date value is empty"),
            Self::Malformed(value) => write!(f, "date is not in YYYY-MM-DD form: `{value}`"),
            Self::NonNumeric(value) => write!(f, "date component is not numeric: `{value}`"),
            Self::OutOfRange(value) => write!(f, "date is not a valid calendar day: `{value}`"),
        }
    }
}

impl Error for DateParseError {}

/// Parses one schedule date string.
///
/// Accepts `YYYY-MM-DD` with optional surrounding whitespace and an optional
/// time suffix on the day component (`2024-01-05T08:00:00`).
///
/// # Errors
/// - `Empty` for blank input.
/// - `Malformed` when the value does not have three components.
/// - `NonNumeric` when any component has non-digit characters.
/// - `OutOfRange` for impossible days such as `2024-02-30`.
pub fn parse_schedule_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    let parts = trimmed.split('-').collect::<Vec<_>>();
    if parts.len() != 3 {
        return Err(DateParseError::Malformed(trimmed.to_string()));
    }

    let day_part = parts[2]
        .split(['T', ' '])
        .next()
        .unwrap_or_default();
    let year = parse_component(parts[0])?;
    let month = parse_component(parts[1])?;
    let day = parse_component(day_part)?;

    let out_of_range = || DateParseError::OutOfRange(trimmed.to_string());
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let month = u32::try_from(month).map_err(|_| out_of_range())?;
    let day = u32::try_from(day).map_err(|_| out_of_range())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)
}

/// Normalizes an optional raw date into `Some(date)` or `None`.
///
/// `None` means "exclude this entry", never a default date.
pub fn normalize_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?;
    match parse_schedule_date(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            debug!("event=date_normalize module=model status=skipped reason=\"{err}\"");
            None
        }
    }
}

fn parse_component(value: &str) -> Result<u64, DateParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(DateParseError::NonNumeric(value.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| DateParseError::OutOfRange(value.to_string()))
}
