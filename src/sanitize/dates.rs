//! Date parsing for the heterogeneous shapes upstream feeds produce:
//! RFC 3339 strings, day-first human formats, unix timestamps in seconds or
//! milliseconds, and free text with a date buried inside it. Every failure
//! path degrades to the caller's default; nothing here returns an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Unix values above this magnitude are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Datetime formats tried before date-only formats. Day-first ordering
/// follows the South African convention: 17/12/2024 is 17 December.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
    "%d %B %Y %H:%M",
    "%d %b %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Date-looking tokens for the fuzzy pass over surrounding prose.
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2})?)?|\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}(?: \d{1,2}:\d{2}(?::\d{2})?)?|\d{1,2} [A-Za-z]{3,9} \d{4}|[A-Za-z]{3,9} \d{1,2},? \d{4}",
    )
    .unwrap()
});

/// Parses a JSON value holding a date in any supported shape.
///
/// Null and empty strings yield `default`; numbers are unix time (seconds,
/// or milliseconds above the threshold); strings go through the day-first
/// format chain with a fuzzy fallback. Unsupported types are logged and
/// yield `default`. Never panics.
pub fn parse_date_value(value: &Value, default: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match value {
        Value::Null => default,
        Value::Number(n) => match n.as_f64().and_then(parse_timestamp) {
            Some(dt) => Some(dt),
            None => {
                warn!(input = %n, "Failed to parse timestamp");
                default
            }
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return default;
            }
            match parse_date_str(trimmed) {
                Some(dt) => Some(dt),
                None => {
                    warn!(input = %trimmed, "Failed to parse date string");
                    default
                }
            }
        }
        other => {
            warn!(input_type = json_type_name(other), "Unsupported date input type");
            default
        }
    }
}

/// Converts a unix timestamp to UTC. Values whose magnitude exceeds the
/// milliseconds threshold are divided by 1000 first. Out-of-range values
/// yield `None`.
pub fn parse_timestamp(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let seconds = if timestamp.abs() > MILLIS_THRESHOLD {
        timestamp / 1000.0
    } else {
        timestamp
    };
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}

/// Parses a date string with day-before-month precedence and tolerance for
/// surrounding non-date text. Date-only inputs become midnight UTC.
pub fn parse_date_str(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_exact(trimmed) {
        return Some(dt);
    }

    // Fuzzy pass: pull date-looking tokens out and try each in turn
    for token in DATE_TOKEN.find_iter(trimmed) {
        if let Some(dt) = parse_exact(token.as_str()) {
            return Some(dt);
        }
    }
    None
}

/// Midnight on the given day, for callers holding an already-typed date.
pub fn datetime_from_date(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn parse_exact(text: &str) -> Option<DateTime<Utc>> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(datetime_from_date(date));
        }
    }
    None
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
