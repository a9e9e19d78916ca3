//! Keyword parsing of natural-language event queries into structured
//! search parameters. The universe of fields is fixed, so the result is an
//! explicit record rather than an open key-value bag.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Time-of-day preference extracted from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

/// Structured search parameters parsed from a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub time_of_day: Option<TimeOfDay>,
}

const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("music", "Music"),
    ("concert", "Music"),
    ("gig", "Music"),
    ("sport", "Sports"),
    ("game", "Sports"),
    ("art", "Arts"),
    ("theater", "Arts"),
    ("food", "Food"),
    ("restaurant", "Food"),
    ("festival", "Festival"),
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "for", "to", "of", "and", "or", "this", "next", "find",
    "show", "me",
];

const MAX_KEYWORDS: usize = 5;

/// Parses a query relative to the current date.
pub fn parse_query(query: &str) -> SearchParams {
    parse_query_at(query, Utc::now().date_naive())
}

/// Deterministic core: "today" is passed in so relative dates are testable.
pub fn parse_query_at(query: &str, today: NaiveDate) -> SearchParams {
    let q = query.to_lowercase();

    let city = if q.contains("johannesburg") || q.contains("joburg") {
        Some("Johannesburg".to_string())
    } else if q.contains("pretoria") {
        Some("Pretoria".to_string())
    } else {
        None
    };

    let category = CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| q.contains(keyword))
        .map(|(_, category)| (*category).to_string());

    let date_range = if q.contains("today") {
        Some((today, today))
    } else if q.contains("tomorrow") {
        let tomorrow = today + Duration::days(1);
        Some((tomorrow, tomorrow))
    } else if q.contains("weekend") {
        Some(upcoming_weekend(today))
    } else {
        None
    };

    let time_of_day = if q.contains("morning") {
        Some(TimeOfDay::Morning)
    } else if q.contains("afternoon") {
        Some(TimeOfDay::Afternoon)
    } else if q.contains("evening") || q.contains("night") {
        Some(TimeOfDay::Evening)
    } else {
        None
    };

    let keywords = q
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(&word.as_str()))
        .take(MAX_KEYWORDS)
        .collect();

    SearchParams {
        city,
        category,
        keywords,
        date_range,
        time_of_day,
    }
}

/// The next Saturday/Sunday pair strictly after `today`.
fn upcoming_weekend(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut days_until_saturday = (Weekday::Sat.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    if days_until_saturday == 0 {
        days_until_saturday = 7;
    }
    let saturday = today + Duration::days(days_until_saturday);
    (saturday, saturday + Duration::days(1))
}
