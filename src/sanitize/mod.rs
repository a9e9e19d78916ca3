//! Data sanitation for raw venue records ingested from upstream APIs.
//!
//! Rules implemented:
//! 1. City name standardization to canonical names
//! 2. Date parsing across heterogeneous formats
//! 3. Title/description cleaning (markup, entities, whitespace)
//! 4. URL validation
//!
//! Everything here is pure and stateless: identical input yields identical
//! output, malformed data degrades to defaults instead of erroring, and
//! `raw_payload` is carried through untouched for lineage.

pub mod city;
pub mod dates;
pub mod text;
pub mod url;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use city::{extract_city_from_address, standardize_city_name, CITY_ALIASES};
pub use dates::{datetime_from_date, parse_date_str, parse_date_value, parse_timestamp};
pub use text::{clean_description, clean_text, clean_title};
pub use url::validate_and_clean_url;

/// Output of the sanitation pipeline. Field presence mirrors the raw
/// record: keys absent upstream stay `None` here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SanitizedEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub event_url: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// The unmodified upstream response, never sanitized.
    pub raw_payload: Option<Value>,
}

/// Applies all sanitation rules to a raw event record.
///
/// Per-field routing: the text fields go through the cleaner with their
/// declared bounds, `city` through the normalizer (falling back to address
/// extraction when the key is absent), `start_date` through the date
/// parser, `event_url` through the URL validator. `source`, `source_id`,
/// `image_url`, coordinates, and `raw_payload` pass through unmodified.
pub fn sanitize_event_data(data: &Value) -> SanitizedEvent {
    SanitizedEvent {
        title: data.get("title").map(|v| clean_title(&raw_text(v))),
        description: data
            .get("description")
            .map(|v| clean_description(&raw_text(v))),
        venue_name: data
            .get("venue_name")
            .map(|v| clean_text(&raw_text(v), Some(500))),
        category: data
            .get("category")
            .map(|v| clean_text(&raw_text(v), Some(200))),
        address: data
            .get("address")
            .map(|v| clean_text(&raw_text(v), Some(500))),
        city: match data.get("city") {
            Some(v) => standardize_city_name(&raw_text(v)),
            None => data
                .get("address")
                .and_then(|v| extract_city_from_address(&raw_text(v))),
        },
        event_url: data
            .get("event_url")
            .map(|v| validate_and_clean_url(&raw_text(v))),
        image_url: string_field(data, "image_url"),
        start_date: data
            .get("start_date")
            .and_then(|v| parse_date_value(v, None)),
        source: string_field(data, "source"),
        source_id: string_field(data, "source_id"),
        latitude: data.get("latitude").and_then(Value::as_f64),
        longitude: data.get("longitude").and_then(Value::as_f64),
        raw_payload: data.get("raw_payload").cloned(),
    }
}

/// Text content of a JSON value, stringifying non-string scalars the way
/// upstream feeds sometimes deliver them.
fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}
