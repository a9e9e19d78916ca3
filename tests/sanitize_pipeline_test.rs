use serde_json::{json, Value};

use event_harvester::sanitize::{sanitize_event_data, SanitizedEvent};

fn messy_record() -> Value {
    json!({
        "source_id": "google_places:ChIJabc",
        "title": "<h1>Carnival &amp; Craft   Market</h1>",
        "description": "Food stalls,\tlive bands &#39;til late.<br/>Family friendly.",
        "venue_name": "  Montecasino  ",
        "category": "Entertainment",
        "address": "Montecasino Blvd, Fourways, Sandton",
        "city": "joburg",
        "event_url": "www.montecasino.co.za/events",
        "start_date": "21/12/2024 10:00",
        "source": "google_places",
    })
}

/// Rebuilds a raw-shaped record from sanitized output, preserving key
/// absence. Dates are rendered as RFC 3339.
fn to_record(sanitized: &SanitizedEvent) -> Value {
    let mut map = serde_json::Map::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            map.insert(key.to_string(), value);
        }
    };
    put("title", sanitized.title.clone().map(Value::from));
    put("description", sanitized.description.clone().map(Value::from));
    put("venue_name", sanitized.venue_name.clone().map(Value::from));
    put("category", sanitized.category.clone().map(Value::from));
    put("address", sanitized.address.clone().map(Value::from));
    put("city", sanitized.city.clone().map(Value::from));
    put("event_url", sanitized.event_url.clone().map(Value::from));
    put("image_url", sanitized.image_url.clone().map(Value::from));
    put(
        "start_date",
        sanitized.start_date.map(|d| Value::from(d.to_rfc3339())),
    );
    put("source", sanitized.source.clone().map(Value::from));
    put("source_id", sanitized.source_id.clone().map(Value::from));
    put("latitude", sanitized.latitude.map(Value::from));
    put("longitude", sanitized.longitude.map(Value::from));
    put("raw_payload", sanitized.raw_payload.clone());
    Value::Object(map)
}

#[test]
fn test_messy_record_comes_out_clean() {
    let sanitized = sanitize_event_data(&messy_record());

    assert_eq!(sanitized.title.as_deref(), Some("Carnival & Craft Market"));
    assert_eq!(
        sanitized.description.as_deref(),
        Some("Food stalls, live bands 'til late. Family friendly.")
    );
    assert_eq!(sanitized.venue_name.as_deref(), Some("Montecasino"));
    assert_eq!(sanitized.city.as_deref(), Some("Johannesburg"));
    assert_eq!(
        sanitized.event_url.as_deref(),
        Some("https://www.montecasino.co.za/events")
    );

    let start = sanitized.start_date.unwrap();
    assert_eq!(
        start.format("%Y-%m-%d %H:%M").to_string(),
        "2024-12-21 10:00"
    );
}

#[test]
fn test_sanitation_is_idempotent() {
    let once = sanitize_event_data(&messy_record());
    let twice = sanitize_event_data(&to_record(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_sanitation_preserves_key_absence_through_round_trip() {
    let once = sanitize_event_data(&json!({
        "source_id": "google_places:sparse",
        "title": "Sparse record",
    }));
    let twice = sanitize_event_data(&to_record(&once));

    assert_eq!(twice.title.as_deref(), Some("Sparse record"));
    assert_eq!(twice.description, None);
    assert_eq!(twice.city, None);
    assert_eq!(twice.start_date, None);
    assert_eq!(once, twice);
}

#[test]
fn test_two_calls_on_same_input_agree() {
    let record = messy_record();
    assert_eq!(sanitize_event_data(&record), sanitize_event_data(&record));
}
