//! URL validation and cleanup. Scheme-less input is assumed HTTPS;
//! structurally invalid URLs come back as the empty string, never an error.

use tracing::debug;
use url::Url;

/// Validates and cleans a URL, returning its canonical serialization or an
/// empty string when the input is absent or structurally invalid.
pub fn validate_and_clean_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(parsed) => {
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                debug!(url = %candidate, scheme = parsed.scheme(), "Rejected URL scheme");
                return String::new();
            }
            if parsed.host_str().map_or(true, str::is_empty) {
                debug!(url = %candidate, "URL has no host");
                return String::new();
            }
            parsed.to_string()
        }
        Err(e) => {
            debug!(url = %candidate, error = %e, "URL parsing failed");
            String::new()
        }
    }
}
