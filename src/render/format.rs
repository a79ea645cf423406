//! Display helpers for article cards.
//!
//! Each helper returns either the formatted text or the input unchanged.
//! Nothing here fails.

use chrono::{DateTime, Utc};

/// Applies `format` to `raw`, falling back to `raw` when it returns `None`.
pub fn format_or_raw<F>(raw: &str, format: F) -> String
where
    F: FnOnce(&str) -> Option<String>,
{
    format(raw).unwrap_or_else(|| raw.to_string())
}

/// `2024-01-15T10:30:00Z` becomes `Jan 15, 2024, 10:30 AM` (UTC).
#[must_use]
pub fn format_published_at(raw: &str) -> String {
    format_or_raw(raw, |value| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).format("%b %-d, %Y, %-I:%M %p").to_string())
    })
}

/// `https://www.example.com/a` becomes `example.com`.
#[must_use]
pub fn format_source_host(raw: &str) -> String {
    format_or_raw(raw, |value| {
        let url = url::Url::parse(value).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_timestamp() {
        assert_eq!(
            format_published_at("2024-01-15T10:30:00Z"),
            "Jan 15, 2024, 10:30 AM"
        );
        assert_eq!(
            format_published_at("2024-07-04T21:05:00Z"),
            "Jul 4, 2024, 9:05 PM"
        );
    }

    #[test]
    fn converts_offsets_to_utc() {
        assert_eq!(
            format_published_at("2024-01-15T12:30:00+02:00"),
            "Jan 15, 2024, 10:30 AM"
        );
    }

    #[test]
    fn unparsable_timestamp_is_shown_raw() {
        assert_eq!(format_published_at("not-a-date"), "not-a-date");
        assert_eq!(format_published_at(""), "");
    }

    #[test]
    fn strips_www_from_host() {
        assert_eq!(format_source_host("https://www.example.com/a"), "example.com");
        assert_eq!(format_source_host("https://example.com/a"), "example.com");
        assert_eq!(
            format_source_host("https://blog.openai.com/post?x=1"),
            "blog.openai.com"
        );
    }

    #[test]
    fn unparsable_url_is_shown_raw() {
        assert_eq!(format_source_host("not a url"), "not a url");
        assert_eq!(format_source_host("mailto:someone"), "mailto:someone");
    }
}
