//! Text cleaning: markup stripping, entity unescaping, whitespace
//! normalization, and bounded truncation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// ASCII control characters (C0 minus whitespace, plus DEL).
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap());

/// Tag-like substrings. Replaced with a space so adjacent words never fuse.
static HTML_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Numeric character references, decimal and hex.
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").unwrap());

/// Named character references.
static NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]{1,30});").unwrap());

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{b0}",
        "pound" => "\u{a3}",
        "euro" => "\u{20ac}",
        "times" => "\u{d7}",
        "eacute" => "\u{e9}",
        "egrave" => "\u{e8}",
        "agrave" => "\u{e0}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        _ => return None,
    })
}

/// Decodes HTML/XML character entities. Numeric references are resolved
/// before named ones so "&amp;#39;" stays "&#39;" after one pass, matching
/// single-pass unescape semantics. Unknown entities are left untouched.
pub fn unescape_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let code = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else {
            caps.get(2).and_then(|d| d.as_str().parse::<u32>().ok())
        };
        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });
    NAMED_ENTITY
        .replace_all(&numeric, |caps: &Captures| match named_entity(&caps[1]) {
            Some(replacement) => replacement.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Cleans and normalizes text content.
///
/// Operations, in order: remove control characters, replace tag-like
/// substrings with a space, unescape entities, collapse whitespace runs,
/// trim, then truncate to `max_length` characters with a trailing "...".
/// Always returns a string; empty input yields an empty string.
pub fn clean_text(text: &str, max_length: Option<usize>) -> String {
    if text.is_empty() {
        return String::new();
    }

    let result: Cow<str> = CONTROL_CHARS.replace_all(text, "");
    let result: Cow<str> = HTML_TAGS.replace_all(&result, " ");
    let result = unescape_entities(&result);
    let result: Cow<str> = WHITESPACE_RUNS.replace_all(&result, " ");
    let result = result.trim();

    match max_length {
        Some(max) if result.chars().count() > max => {
            let mut truncated: String = result.chars().take(max.saturating_sub(3)).collect();
            truncated.push_str("...");
            truncated
        }
        _ => result.to_string(),
    }
}

/// Cleans an event/venue title, bounded to 500 characters.
pub fn clean_title(title: &str) -> String {
    clean_text(title, Some(500))
}

/// Cleans an event/venue description, bounded to 5000 characters.
pub fn clean_description(description: &str) -> String {
    clean_text(description, Some(5000))
}
