use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::{DEFAULT_CITY, SOURCE_GOOGLE_PLACES};
use crate::sanitize::SanitizedEvent;

/// A persisted event/venue row.
///
/// `source_id` ("<source-name>:<upstream-id>") is the sole uniqueness key
/// and the only immutable field besides `id` and `created_at`: every
/// re-ingestion replaces the full non-key field set. Rows are created and
/// mutated only by the reconciler; deletion is an administrative concern
/// outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: Option<Uuid>,
    pub source_id: String,
    pub title: String,
    pub venue_name: String,
    pub description: String,
    pub city: String,
    pub address: String,
    pub category: String,
    pub event_url: String,
    pub image_url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: String,
    pub start_date: Option<DateTime<Utc>>,
    /// Complete original upstream response, kept verbatim for lineage.
    pub raw_payload: Value,
    pub created_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Builds a fresh row from pipeline output. `id` is assigned by the
    /// store at create time.
    pub fn from_sanitized(source_id: &str, sanitized: &SanitizedEvent) -> Self {
        let mut event = Self {
            id: None,
            source_id: source_id.to_string(),
            title: String::new(),
            venue_name: String::new(),
            description: String::new(),
            city: String::new(),
            address: String::new(),
            category: String::new(),
            event_url: String::new(),
            image_url: String::new(),
            latitude: None,
            longitude: None,
            source: String::new(),
            start_date: None,
            raw_payload: Value::Null,
            created_at: Utc::now(),
        };
        event.apply(sanitized);
        event
    }

    /// Replaces every non-key field with the new sanitized values. Never a
    /// partial update: `id`, `source_id`, and `created_at` survive, the
    /// rest is overwritten wholesale.
    pub fn apply(&mut self, sanitized: &SanitizedEvent) {
        self.title = sanitized.title.clone().unwrap_or_default();
        self.venue_name = sanitized.venue_name.clone().unwrap_or_default();
        self.description = sanitized.description.clone().unwrap_or_default();
        self.city = sanitized
            .city
            .clone()
            .unwrap_or_else(|| DEFAULT_CITY.to_string());
        self.address = sanitized.address.clone().unwrap_or_default();
        self.category = sanitized.category.clone().unwrap_or_default();
        self.event_url = sanitized.event_url.clone().unwrap_or_default();
        self.image_url = sanitized.image_url.clone().unwrap_or_default();
        self.latitude = sanitized.latitude;
        self.longitude = sanitized.longitude;
        self.source = sanitized
            .source
            .clone()
            .unwrap_or_else(|| SOURCE_GOOGLE_PLACES.to_string());
        self.start_date = sanitized.start_date;
        self.raw_payload = sanitized.raw_payload.clone().unwrap_or(Value::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_all_non_key_fields() {
        let first = SanitizedEvent {
            title: Some("Old Title".to_string()),
            city: Some("Pretoria".to_string()),
            latitude: Some(-25.7),
            ..Default::default()
        };
        let mut event = StoredEvent::from_sanitized("google_places:x", &first);
        event.id = Some(Uuid::new_v4());
        let original_id = event.id;
        let original_created = event.created_at;

        let second = SanitizedEvent {
            title: Some("New Title".to_string()),
            ..Default::default()
        };
        event.apply(&second);

        assert_eq!(event.title, "New Title");
        // Fields unset in the new record fall back to defaults rather than
        // keeping stale values
        assert_eq!(event.city, DEFAULT_CITY);
        assert_eq!(event.latitude, None);
        assert_eq!(event.id, original_id);
        assert_eq!(event.source_id, "google_places:x");
        assert_eq!(event.created_at, original_created);
    }
}
