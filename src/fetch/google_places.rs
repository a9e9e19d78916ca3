//! Google Places (New) venue fetcher.
//!
//! Google has no dedicated events API, so venues that host events are
//! fetched via Text Search per venue type and treated as potential event
//! locations. Raw API responses are kept in `raw_payload` for lineage.

use crate::config::{CityConfig, Config};
use crate::constants::{self, EVENT_VENUE_TYPES};
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const TEXT_SEARCH_URL: &str = "https://places.googleapis.com/v1/places:searchText";

const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.types,places.websiteUri,places.googleMapsUri,\
places.primaryType,places.editorialSummary,places.photos";

const MAX_RESULTS_PER_QUERY: u32 = 20;

/// Cap on the backoff exponent so high retry settings cannot overflow the
/// shift or produce hour-long waits. 2^6 = 64 seconds at most.
const MAX_BACKOFF_EXPONENT: u32 = 6;

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << (attempt - 1).min(MAX_BACKOFF_EXPONENT))
}

/// Upstream venue source boundary. Implementations return raw venue
/// records carrying a `source_id` of the form "<source>:<opaque-id>".
#[async_trait]
pub trait VenueFetcher: Send + Sync {
    async fn fetch_venues(&self, city: &str, max_results: usize) -> Result<Vec<Value>>;
    async fn fetch_all_cities(&self, max_per_city: usize) -> Result<Vec<Value>>;
}

pub struct GooglePlacesFetcher {
    api_key: String,
    config: Config,
    client: reqwest::Client,
}

impl GooglePlacesFetcher {
    pub fn new(api_key: String, config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search.timeout_seconds))
            .build()?;
        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// POST with bounded retry: exponential backoff on HTTP 429 and
    /// transport errors, immediate failure on other API errors.
    async fn post_with_retry(&self, body: &Value) -> Result<Value> {
        let max_retries = self.config.search.max_retries.max(1);
        let mut last_err: Option<HarvestError> = None;

        for attempt in 0..max_retries {
            if attempt > 0 {
                let wait = backoff_delay(attempt);
                warn!(attempt, wait_secs = wait.as_secs(), "Backing off before retry");
                tokio::time::sleep(wait).await;
            }

            let response = self
                .client
                .post(TEXT_SEARCH_URL)
                .header("Content-Type", "application/json")
                .header("X-Goog-Api-Key", &self.api_key)
                .header("X-Goog-FieldMask", FIELD_MASK)
                .json(body)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(resp.json::<Value>().await?);
                }
                Ok(resp) if resp.status().as_u16() == 429 => {
                    warn!(attempt, "Rate limited by Places API");
                    last_err = Some(HarvestError::Api {
                        message: "rate limited by Places API".to_string(),
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    error!(%status, body = %text, "Places API error");
                    return Err(HarvestError::Api {
                        message: format!("Places API returned {}: {}", status, text),
                    });
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Request failed");
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or(HarvestError::Api {
            message: "retries exhausted".to_string(),
        }))
    }

    async fn text_search(
        &self,
        query: &str,
        city: Option<&CityConfig>,
        venue_type: &str,
    ) -> Result<Vec<Value>> {
        let mut body = json!({
            "textQuery": query,
            "languageCode": "en",
            "maxResultCount": MAX_RESULTS_PER_QUERY,
        });
        if let Some(cfg) = city {
            body["locationBias"] = json!({
                "circle": {
                    "center": { "latitude": cfg.latitude, "longitude": cfg.longitude },
                    "radius": self.config.search.radius_meters,
                }
            });
        }

        let response = self.post_with_retry(&body).await?;
        let places = response
            .get("places")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        debug!(query, count = places.len(), "Text search returned places");

        Ok(places
            .iter()
            .map(|place| self.transform_place(place, venue_type))
            .collect())
    }

    /// Shapes one Places result into the raw record layout the sanitation
    /// pipeline expects. The complete place response travels along in
    /// `raw_payload`.
    fn transform_place(&self, place: &Value, venue_type: &str) -> Value {
        let title = place
            .pointer("/displayName/text")
            .and_then(Value::as_str)
            .or_else(|| place.get("displayName").and_then(Value::as_str))
            .unwrap_or("Unknown Venue")
            .to_string();

        let primary_type = place
            .get("primaryType")
            .and_then(Value::as_str)
            .unwrap_or(venue_type);
        let category = constants::category_for_place_type(primary_type)
            .or_else(|| constants::category_for_place_type(venue_type))
            .unwrap_or(constants::DEFAULT_CATEGORY);

        let description = place
            .pointer("/editorialSummary/text")
            .and_then(Value::as_str)
            .unwrap_or("");

        // Prefer the venue's own website over its Google Maps page
        let event_url = place
            .get("websiteUri")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| place.get("googleMapsUri").and_then(Value::as_str))
            .unwrap_or("");

        let address = place
            .get("formattedAddress")
            .and_then(Value::as_str)
            .unwrap_or("");
        let city = crate::sanitize::extract_city_from_address(address)
            .unwrap_or_else(|| constants::DEFAULT_CITY.to_string());

        let image_url = self
            .photo_url(place)
            .unwrap_or_else(|| placeholder_image(primary_type, &city));

        let place_id = place.get("id").and_then(Value::as_str).unwrap_or("");

        json!({
            "source_id": format!("{}:{}", constants::SOURCE_GOOGLE_PLACES, place_id),
            "title": title.clone(),
            "venue_name": title,
            "description": description,
            "city": city,
            "address": address,
            "category": category,
            "event_url": event_url,
            "image_url": image_url,
            "latitude": place.pointer("/location/latitude"),
            "longitude": place.pointer("/location/longitude"),
            "source": constants::SOURCE_GOOGLE_PLACES,
            "start_date": Value::Null,
            "raw_payload": {
                "place": place,
                "search_query": venue_type,
                "fetched_at": Utc::now().to_rfc3339(),
            },
        })
    }

    fn photo_url(&self, place: &Value) -> Option<String> {
        let photo = place
            .get("photos")
            .and_then(Value::as_array)
            .and_then(|photos| photos.first())?;

        if let Some(name) = photo
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            return Some(format!(
                "https://places.googleapis.com/v1/{}/media?key={}&maxWidthPx=800",
                name, self.api_key
            ));
        }
        // Legacy photo reference shape
        photo
            .get("photoReference")
            .and_then(Value::as_str)
            .or_else(|| photo.as_str())
            .map(|reference| {
                format!(
                    "https://maps.googleapis.com/maps/api/place/photo?maxwidth=800&photoreference={}&key={}",
                    reference, self.api_key
                )
            })
    }
}

fn placeholder_image(place_type: &str, city: &str) -> String {
    let category_slug = if place_type.is_empty() {
        "event".to_string()
    } else {
        place_type.replace('_', "-")
    };
    let city_slug = if city.is_empty() {
        "venue".to_string()
    } else {
        city.to_lowercase()
    };
    format!(
        "https://source.unsplash.com/800x600/?{},venue,{}",
        category_slug, city_slug
    )
}

#[async_trait]
impl VenueFetcher for GooglePlacesFetcher {
    async fn fetch_venues(&self, city: &str, max_results: usize) -> Result<Vec<Value>> {
        let city_config = self.config.city(city);
        if city_config.is_none() {
            warn!(city, "Unknown city, searching without location bias");
        }

        let mut seen = HashSet::new();
        let mut venues = Vec::new();

        for venue_type in EVENT_VENUE_TYPES {
            if venues.len() >= max_results {
                break;
            }

            let query = format!("{} in {}, South Africa", venue_type.replace('_', " "), city);
            match self.text_search(&query, city_config, venue_type).await {
                Ok(batch) => {
                    for record in batch {
                        let id = record
                            .get("source_id")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string();
                        if seen.insert(id) {
                            venues.push(record);
                        }
                    }
                }
                Err(e) => {
                    error!(venue_type = %venue_type, error = %e, "Search failed for venue type");
                }
            }

            tokio::time::sleep(Duration::from_millis(self.config.search.delay_ms)).await;
        }

        venues.truncate(max_results);
        Ok(venues)
    }

    async fn fetch_all_cities(&self, max_per_city: usize) -> Result<Vec<Value>> {
        let mut all_venues = Vec::new();
        for city in &self.config.cities {
            info!(city = %city.canonical_name, "Searching venues");
            let venues = self
                .fetch_venues(&city.canonical_name, max_per_city)
                .await?;
            info!(city = %city.canonical_name, count = venues.len(), "City search complete");
            all_venues.extend(venues);
        }
        Ok(all_venues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> GooglePlacesFetcher {
        let config: Config = toml::from_str(
            r#"
            [search]
            radius_meters = 50000
            delay_ms = 0
            timeout_seconds = 5
            max_retries = 1

            [[cities]]
            key = "johannesburg"
            canonical_name = "Johannesburg"
            latitude = -26.2041
            longitude = 28.0473
            "#,
        )
        .unwrap();
        GooglePlacesFetcher::new("test-key".to_string(), config).unwrap()
    }

    #[test]
    fn test_backoff_delay_doubles_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(7), Duration::from_secs(64));
        // Retry settings beyond the exponent cap must not overflow the shift
        assert_eq!(backoff_delay(100), Duration::from_secs(64));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(64));
    }

    #[test]
    fn test_transform_place_shapes_raw_record() {
        let place = json!({
            "id": "abc123",
            "displayName": { "text": "The Orbit" },
            "formattedAddress": "81 De Korte St, Braamfontein, Johannesburg",
            "location": { "latitude": -26.1929, "longitude": 28.0305 },
            "primaryType": "live_music_venue",
            "websiteUri": "https://theorbit.co.za",
            "editorialSummary": { "text": "Jazz club and restaurant" }
        });

        let record = fetcher().transform_place(&place, "night_club");
        assert_eq!(record["source_id"], "google_places:abc123");
        assert_eq!(record["title"], "The Orbit");
        assert_eq!(record["venue_name"], "The Orbit");
        assert_eq!(record["category"], "Music");
        assert_eq!(record["city"], "Johannesburg");
        assert_eq!(record["event_url"], "https://theorbit.co.za");
        assert_eq!(record["latitude"], -26.1929);
        assert_eq!(record["raw_payload"]["place"]["id"], "abc123");
        assert_eq!(record["raw_payload"]["search_query"], "night_club");
    }

    #[test]
    fn test_transform_place_falls_back_to_searched_type_category() {
        let place = json!({
            "id": "x",
            "displayName": { "text": "Somewhere" },
            "formattedAddress": "Pretoria"
        });
        let record = fetcher().transform_place(&place, "night_club");
        assert_eq!(record["category"], "Nightlife");
        assert_eq!(record["city"], "Pretoria");
    }

    #[test]
    fn test_missing_photo_yields_placeholder_image() {
        let place = json!({
            "id": "x",
            "displayName": { "text": "Somewhere" },
            "primaryType": "art_gallery",
            "formattedAddress": "Sandton"
        });
        let record = fetcher().transform_place(&place, "art_gallery");
        let image_url = record["image_url"].as_str().unwrap();
        assert!(image_url.starts_with("https://source.unsplash.com/"));
        assert!(image_url.contains("art-gallery"));
    }

    #[test]
    fn test_photo_name_builds_media_url() {
        let place = json!({
            "id": "x",
            "displayName": { "text": "Somewhere" },
            "formattedAddress": "Johannesburg",
            "photos": [{ "name": "places/abc/photos/def" }]
        });
        let record = fetcher().transform_place(&place, "bar");
        assert_eq!(
            record["image_url"],
            "https://places.googleapis.com/v1/places/abc/photos/def/media?key=test-key&maxWidthPx=800"
        );
    }

    #[test]
    fn test_maps_uri_fallback_for_event_url() {
        let place = json!({
            "id": "x",
            "displayName": { "text": "Somewhere" },
            "formattedAddress": "Johannesburg",
            "googleMapsUri": "https://maps.google.com/?cid=1"
        });
        let record = fetcher().transform_place(&place, "bar");
        assert_eq!(record["event_url"], "https://maps.google.com/?cid=1");
    }
}
