use crate::db::ArticleRow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUMMARY_TRUNCATE_SUFFIX: &str = "...";

/// Display-ready article as sent over the wire.
///
/// `published_at` is kept as text: the API produces ISO-8601 UTC strings, but
/// records coming back from a client are not guaranteed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub summary_truncated: String,
    pub published_at: String,
    pub source_url: String,
}

/// Input for the storage insert path.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub source_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("article id must be positive, got {0}")]
    NonPositiveId(i32),

    #[error("article {0} has an empty title")]
    EmptyTitle(i32),

    #[error("article {id} has an invalid source url: {reason}")]
    InvalidSourceUrl { id: i32, reason: String },
}

impl Article {
    /// Formats a stored row for display.
    pub fn from_row(row: ArticleRow, summary_max_length: usize) -> Result<Self, RecordError> {
        if row.id <= 0 {
            return Err(RecordError::NonPositiveId(row.id));
        }

        if row.title.trim().is_empty() {
            return Err(RecordError::EmptyTitle(row.id));
        }

        url::Url::parse(&row.source_url).map_err(|e| RecordError::InvalidSourceUrl {
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: row.id,
            summary_truncated: truncate_summary(&row.summary, summary_max_length),
            published_at: format_utc_iso8601(&row.published_at),
            title: row.title,
            source_url: row.source_url,
        })
    }

    #[must_use]
    pub fn is_summary_truncated(&self) -> bool {
        self.summary_truncated.ends_with(SUMMARY_TRUNCATE_SUFFIX)
    }
}

/// Cuts `summary` to `max_length` characters and appends `...`.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character. Summaries at or under the limit come back unchanged.
#[must_use]
pub fn truncate_summary(summary: &str, max_length: usize) -> String {
    match summary.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{}", &summary[..cut], SUMMARY_TRUNCATE_SUFFIX),
        None => summary.to_string(),
    }
}

/// `2024-01-15T10:30:00Z`, with fractional seconds only when present.
#[must_use]
pub fn format_utc_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
