//! Domain service for reading the latest articles.
//!
//! Failures are reported as an [`ArticleError`] carrying an
//! [`ArticleErrorKind`], which the HTTP layer maps to a status code.

use crate::models::article::Article;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleErrorKind {
    /// The caller passed bad input. Not retryable.
    Validation,

    /// The database could not be reached or the query failed in transit.
    StorageUnavailable,

    /// Anything else. Logged with detail, never retried.
    Internal,
}

impl ArticleErrorKind {
    /// Only storage outages are worth retrying, and only by the caller.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::StorageUnavailable => "storage_unavailable",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ArticleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ArticleError {
    pub kind: ArticleErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<BoxedCause>,
    pub occurred_at: DateTime<Utc>,
}

impl ArticleError {
    fn new(kind: ArticleErrorKind, message: impl Into<String>, cause: Option<BoxedCause>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause,
            occurred_at: Utc::now(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ArticleErrorKind::Validation, message, None)
    }

    pub fn storage_unavailable<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(
            ArticleErrorKind::StorageUnavailable,
            message,
            Some(Box::new(cause)),
        )
    }

    pub fn internal<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(ArticleErrorKind::Internal, message, Some(Box::new(cause)))
    }

    /// Text of the underlying cause, for logs only.
    #[must_use]
    pub fn cause_detail(&self) -> Option<String> {
        self.cause.as_ref().map(ToString::to_string)
    }
}

impl From<sea_orm::DbErr> for ArticleError {
    fn from(err: sea_orm::DbErr) -> Self {
        match classify_db_error(&err) {
            ArticleErrorKind::StorageUnavailable => {
                Self::storage_unavailable("Database query failed", err)
            }
            _ => Self::internal("Unexpected database error", err),
        }
    }
}

/// Decides whether a database error is an outage or a bug.
///
/// Lost connections, pool exhaustion and a busy or unreadable database file
/// are outages. Constraint violations, rows that fail to decode and schema
/// errors such as a missing table mean the data or the code is wrong, so
/// they are internal.
#[must_use]
pub fn classify_db_error(err: &sea_orm::DbErr) -> ArticleErrorKind {
    use sea_orm::DbErr;

    if err.sql_err().is_some() {
        return ArticleErrorKind::Internal;
    }

    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => ArticleErrorKind::StorageUnavailable,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => classify_runtime_error(runtime),
        _ => ArticleErrorKind::Internal,
    }
}

fn classify_runtime_error(err: &sea_orm::RuntimeErr) -> ArticleErrorKind {
    if let sea_orm::RuntimeErr::SqlxError(sqlx_err) = err {
        classify_sqlx_error(sqlx_err)
    } else {
        ArticleErrorKind::StorageUnavailable
    }
}

fn classify_sqlx_error(err: &sea_orm::sqlx::Error) -> ArticleErrorKind {
    use sea_orm::sqlx::Error;

    match err {
        Error::Io(_)
        | Error::Tls(_)
        | Error::PoolTimedOut
        | Error::PoolClosed
        | Error::WorkerCrashed => ArticleErrorKind::StorageUnavailable,
        Error::Database(db_err) => {
            let transient = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| is_transient_sqlite_code(code & 0xff));
            if transient {
                ArticleErrorKind::StorageUnavailable
            } else {
                ArticleErrorKind::Internal
            }
        }
        _ => ArticleErrorKind::Internal,
    }
}

/// Primary SQLite result codes that clear up without code or data changes:
/// BUSY, LOCKED, IOERR, FULL, CANTOPEN.
const fn is_transient_sqlite_code(primary: i32) -> bool {
    matches!(primary, 5 | 6 | 10 | 13 | 14)
}

/// Domain service trait for article retrieval.
#[async_trait::async_trait]
pub trait ArticleService: Send + Sync {
    /// Returns up to `limit` of the most recently published articles.
    ///
    /// Results are ordered by publication time, newest first, with ties
    /// broken by the higher id.
    ///
    /// # Errors
    ///
    /// Returns a [`ArticleErrorKind::Validation`] error when `limit` is not
    /// positive or exceeds the configured maximum; storage is not touched.
    /// Returns [`ArticleErrorKind::StorageUnavailable`] when the query fails.
    /// Returns [`ArticleErrorKind::Internal`] when a row cannot be formatted.
    async fn get_latest_articles(&self, limit: i64) -> Result<Vec<Article>, ArticleError>;

    /// Same as [`Self::get_latest_articles`] with the configured default limit.
    async fn get_default_latest_articles(&self) -> Result<Vec<Article>, ArticleError>;

    /// Whether the database answers a ping.
    async fn storage_reachable(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn connection_errors_are_storage_unavailable() {
        let err = DbErr::Conn(RuntimeErr::Internal("connection refused".to_string()));
        assert_eq!(
            classify_db_error(&err),
            ArticleErrorKind::StorageUnavailable
        );

        let err: ArticleError = err.into();
        assert_eq!(err.kind, ArticleErrorKind::StorageUnavailable);
        assert!(err.kind.is_retryable());
        assert!(err.cause_detail().unwrap().contains("connection refused"));
    }

    #[test]
    fn query_errors_are_storage_unavailable() {
        let err = DbErr::Query(RuntimeErr::Internal("disk I/O error".to_string()));
        assert_eq!(
            classify_db_error(&err),
            ArticleErrorKind::StorageUnavailable
        );
    }

    #[test]
    fn pool_errors_are_storage_unavailable() {
        use sea_orm::sqlx::Error;

        for err in [Error::PoolTimedOut, Error::PoolClosed] {
            let err = DbErr::Query(RuntimeErr::SqlxError(err));
            assert_eq!(
                classify_db_error(&err),
                ArticleErrorKind::StorageUnavailable
            );
        }
    }

    #[test]
    fn decode_and_schema_errors_are_internal() {
        use sea_orm::sqlx::Error;

        let err = DbErr::Query(RuntimeErr::SqlxError(Error::ColumnNotFound(
            "published_at".to_string(),
        )));
        assert_eq!(classify_db_error(&err), ArticleErrorKind::Internal);

        let err = DbErr::Query(RuntimeErr::SqlxError(Error::Decode(
            "invalid datetime: garbage".into(),
        )));
        assert_eq!(classify_db_error(&err), ArticleErrorKind::Internal);
    }

    #[test]
    fn sqlite_busy_is_transient() {
        assert!(is_transient_sqlite_code(5));
        assert!(is_transient_sqlite_code(517 & 0xff));
        assert!(!is_transient_sqlite_code(1));
        assert!(!is_transient_sqlite_code(19));
    }

    #[test]
    fn conversion_errors_are_internal() {
        let err = DbErr::Type("bad timestamp".to_string());
        assert_eq!(classify_db_error(&err), ArticleErrorKind::Internal);

        let err: ArticleError = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.kind, ArticleErrorKind::Internal);
        assert!(!err.kind.is_retryable());
    }

    #[test]
    fn error_display_includes_kind() {
        let err = ArticleError::validation("limit must be positive");
        assert_eq!(err.to_string(), "validation_error: limit must be positive");
        assert!(err.cause.is_none());
    }
}
