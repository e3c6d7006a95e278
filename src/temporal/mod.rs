//! Strict date and datetime literals
//!
//! Only the canonical forms are accepted:
//! - date: `YYYY-MM-DD`
//! - datetime: `YYYY-MM-DDTHH:mm:ss`
//!
//! Nothing here panics or returns an error. Invalid input is reported as
//! `false` / `None`, and `format` hands unparseable text back unchanged.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// chrono format string for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// chrono format string for datetimes
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Which canonical literal is expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Date,
    Datetime,
}

impl DateKind {
    /// Character template: `d` is any ASCII digit, everything else is literal.
    fn template(&self) -> &'static str {
        match self {
            DateKind::Date => "dddd-dd-dd",
            DateKind::Datetime => "dddd-dd-ddTdd:dd:dd",
        }
    }

    /// Human-readable canonical form, used in error messages.
    pub fn canonical(&self) -> &'static str {
        match self {
            DateKind::Date => "YYYY-MM-DD",
            DateKind::Datetime => "YYYY-MM-DDTHH:mm:ss",
        }
    }
}

/// Returns true if `text` is a canonical literal of the given kind that
/// names a real calendar date (and time).
pub fn is_valid(text: &str, kind: DateKind) -> bool {
    match kind {
        DateKind::Date => parse_date(text).is_some(),
        DateKind::Datetime => parse_datetime(text).is_some(),
    }
}

/// Re-emits `text` in canonical form, or returns it unchanged when it does
/// not parse.
pub fn format(text: &str, kind: DateKind) -> String {
    match kind {
        DateKind::Date => parse_date(text)
            .map(format_date)
            .unwrap_or_else(|| text.to_string()),
        DateKind::Datetime => parse_datetime(text)
            .map(format_datetime)
            .unwrap_or_else(|| text.to_string()),
    }
}

/// Parses a strict `YYYY-MM-DD` literal.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if looks_like_unix_timestamp(text) || !matches_template(text, DateKind::Date) {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Parses a strict `YYYY-MM-DDTHH:mm:ss` literal.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if looks_like_unix_timestamp(text) || !matches_template(text, DateKind::Datetime) {
        return None;
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// chrono accepts short numeric fields, so the exact shape is checked first.
fn matches_template(text: &str, kind: DateKind) -> bool {
    let template = kind.template();
    text.len() == template.len()
        && text
            .bytes()
            .zip(template.bytes())
            .all(|(c, t)| match t {
                b'd' => c.is_ascii_digit(),
                _ => c == t,
            })
}

/// Ten bare digits read like seconds since the epoch and are never a date.
fn looks_like_unix_timestamp(text: &str) -> bool {
    text.len() == 10 && text.bytes().all(|c| c.is_ascii_digit())
}
