//! Shared name tables for the Google Places source.

/// Source name prefixed onto upstream place ids to build `source_id` values.
pub const SOURCE_GOOGLE_PLACES: &str = "google_places";

/// City assigned when neither the record nor its address yields one.
pub const DEFAULT_CITY: &str = "Johannesburg";

/// Category assigned when a place type has no mapping.
pub const DEFAULT_CATEGORY: &str = "General";

/// Google Places types that are likely to host events. Searched in order;
/// the fetcher stops early once it has enough unique venues.
pub const EVENT_VENUE_TYPES: &[&str] = &[
    "night_club",
    "bar",
    "restaurant",
    "museum",
    "art_gallery",
    "movie_theater",
    "performing_arts_theater",
    "stadium",
    "tourist_attraction",
    "amusement_park",
    "bowling_alley",
    "casino",
    "convention_center",
    "cultural_center",
    "event_venue",
    "live_music_venue",
    "concert_hall",
];

/// Map Google Place types to our category names.
pub const CATEGORY_MAPPING: &[(&str, &str)] = &[
    ("night_club", "Nightlife"),
    ("bar", "Nightlife"),
    ("restaurant", "Food & Dining"),
    ("museum", "Arts & Culture"),
    ("art_gallery", "Arts & Culture"),
    ("movie_theater", "Entertainment"),
    ("performing_arts_theater", "Performing Arts"),
    ("stadium", "Sports"),
    ("tourist_attraction", "Attractions"),
    ("amusement_park", "Entertainment"),
    ("bowling_alley", "Entertainment"),
    ("casino", "Entertainment"),
    ("convention_center", "Business & Conferences"),
    ("cultural_center", "Arts & Culture"),
    ("event_venue", "Events"),
    ("live_music_venue", "Music"),
    ("concert_hall", "Music"),
];

pub fn category_for_place_type(place_type: &str) -> Option<&'static str> {
    CATEGORY_MAPPING
        .iter()
        .find(|(t, _)| *t == place_type)
        .map(|(_, category)| *category)
}
