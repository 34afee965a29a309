//! Date parsing and formatting shared by the date rules and the date components.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Canonical text form of a stored date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical text form of a stored date-time.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",  // 2024-03-05
    "%d/%m/%Y",  // 05/03/2024
    "%d %B %Y",  // 5 March 2024
    "%d %b %Y",  // 5 Mar 2024
];

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Parses a submitted or stored date. Years outside 1000-9999 are rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
        .filter(|date| (1000..=9999).contains(&date.year()))
}

/// Parses a submitted or stored date-time. Years outside 1000-9999 are rejected.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .filter(|dt| (1000..=9999).contains(&dt.year()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// `2024-03-05` as it appears to a reader: `5 March 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

pub fn display_datetime(dt: NaiveDateTime) -> String {
    dt.format("%-d %B %Y %H:%M").to_string()
}

/// The value a `datetime-local` input expects; seconds only when they matter.
pub fn datetime_input_value(dt: NaiveDateTime) -> String {
    if dt.second() == 0 {
        dt.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        dt.format(DATETIME_FORMAT).to_string()
    }
}

/// Formats a stored date or date-time for display, falling back to the raw text.
pub fn display_stored(text: &str, with_time: bool) -> String {
    let formatted = if with_time {
        parse_datetime(text).map(display_datetime)
    } else {
        parse_date(text).map(display_date)
    };
    formatted.unwrap_or_else(|| text.to_string())
}
