//! Date normalization for extract values.
//!
//! Extracts disagree on date formats: ISO timestamps from the identity
//! provider, `YYYY/MM/DD HH:MM:SS` from the productivity suite, day-first
//! dates typed into HR sheets, spreadsheet serial numbers and Unix epochs.
//! [`DateNormalizer`] reduces all of them to a [`NaiveDate`]. Any time of day
//! is discarded.

use crate::config::DateOrder;
use chrono::{DateTime, Datelike, Duration, NaiveDate};
use thiserror::Error;

const YEAR_FIRST: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DAY_FIRST: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];
const MONTH_FIRST: [&str; 3] = ["%m-%d-%Y", "%m/%d/%Y", "%m.%d.%Y"];
/// `%b` also accepts full month names when parsing.
const MONTH_NAME: [&str; 5] = ["%d %b %Y", "%d-%b-%Y", "%b %d, %Y", "%b %d %Y", "%a, %d %b %Y"];

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Why a value could not be read as a date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("unrecognized date format")]
    Unrecognized,

    #[error("date outside 1900-2100")]
    OutOfRange,
}

/// Parses the date formats found in HR and IT extracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    order: DateOrder,
}

impl DateNormalizer {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    /// Parses a non-null value.
    pub fn parse(&self, raw: &str) -> Result<NaiveDate, DateParseError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DateParseError::Unrecognized);
        }

        let date = match parse_numeric(value) {
            Some(result) => result?,
            None => self.parse_text(value).ok_or(DateParseError::Unrecognized)?,
        };

        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(DateParseError::OutOfRange);
        }
        Ok(date)
    }

    fn parse_text(&self, value: &str) -> Option<NaiveDate> {
        let (preferred, fallback) = match self.order {
            DateOrder::DayFirst => (DAY_FIRST, MONTH_FIRST),
            DateOrder::MonthFirst => (MONTH_FIRST, DAY_FIRST),
        };

        YEAR_FIRST
            .iter()
            .chain(preferred.iter())
            .chain(fallback.iter())
            .chain(MONTH_NAME.iter())
            .find_map(|fmt| parse_with_time(value, fmt))
    }
}

/// Parses the date prefix and accepts a trailing time of day.
fn parse_with_time(value: &str, fmt: &str) -> Option<NaiveDate> {
    let (date, rest) = NaiveDate::parse_and_remainder(value, fmt).ok()?;
    if rest.is_empty() || is_time_suffix(rest) {
        Some(date)
    } else {
        None
    }
}

fn is_time_suffix(rest: &str) -> bool {
    let Some(body) = rest
        .strip_prefix('T')
        .or_else(|| rest.strip_prefix(char::is_whitespace))
    else {
        return false;
    };
    body.trim_start().starts_with(|c: char| c.is_ascii_digit())
}

/// Spreadsheet serials, `YYYYMMDD`, Unix seconds and milliseconds.
///
/// Returns `None` when the value is not purely numeric.
fn parse_numeric(value: &str) -> Option<Result<NaiveDate, DateParseError>> {
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    let numeric = !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit());
    if !numeric {
        return None;
    }

    let Ok(whole) = int_part.parse::<i64>() else {
        return Some(Err(DateParseError::OutOfRange));
    };

    let date = match int_part.len() {
        // Shorter numbers are more likely years or day counts than serials.
        5 | 6 => {
            // Serial day numbers count from 1899-12-30.
            if whole < 10_000 {
                return Some(Err(DateParseError::OutOfRange));
            }
            NaiveDate::from_ymd_opt(1899, 12, 30).map(|base| base + Duration::days(whole))
        }
        8 if frac_part.is_empty() => NaiveDate::parse_from_str(int_part, "%Y%m%d").ok(),
        9 | 10 => DateTime::from_timestamp(whole, 0).map(|dt| dt.date_naive()),
        12 | 13 => DateTime::from_timestamp(whole / 1000, 0).map(|dt| dt.date_naive()),
        _ => None,
    };

    Some(date.ok_or(DateParseError::Unrecognized))
}
