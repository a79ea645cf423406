//! Default implementation of the `ArticleService` trait.

use crate::config::ArticleQueryConfig;
use crate::db::ArticleReader;
use crate::models::article::Article;
use crate::services::article_service::{ArticleError, ArticleService};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

pub struct DefaultArticleService {
    reader: Arc<dyn ArticleReader>,
    config: ArticleQueryConfig,
}

impl DefaultArticleService {
    #[must_use]
    pub fn new(reader: Arc<dyn ArticleReader>, config: ArticleQueryConfig) -> Self {
        Self { reader, config }
    }

    fn validate_limit(&self, limit: i64) -> Result<u64, ArticleError> {
        if limit <= 0 {
            return Err(ArticleError::validation(format!(
                "Invalid limit: {limit}. Limit must be a positive integer"
            )));
        }

        if limit > self.config.max_limit {
            return Err(ArticleError::validation(format!(
                "Invalid limit: {limit}. Limit must be at most {}",
                self.config.max_limit
            )));
        }

        u64::try_from(limit).map_err(|_| ArticleError::validation("Limit out of range"))
    }

    async fn fetch_and_format(&self, limit: u64) -> Result<Vec<Article>, ArticleError> {
        let rows = self.reader.latest_articles(limit).await?;

        rows.into_iter()
            .map(|row| {
                Article::from_row(row, self.config.summary_max_length)
                    .map_err(|e| ArticleError::internal("Failed to format article", e))
            })
            .collect()
    }
}

/// True when `elapsed` is strictly over the budget.
#[must_use]
pub fn exceeds_budget(elapsed: Duration, threshold_ms: u64) -> bool {
    elapsed > Duration::from_millis(threshold_ms)
}

#[async_trait]
impl ArticleService for DefaultArticleService {
    async fn get_latest_articles(&self, limit: i64) -> Result<Vec<Article>, ArticleError> {
        let limit = self.validate_limit(limit)?;

        let start = Instant::now();
        let result = self.fetch_and_format(limit).await;
        let elapsed = start.elapsed();

        metrics::histogram!("article_query_duration_seconds").record(elapsed.as_secs_f64());

        if exceeds_budget(elapsed, self.config.slow_query_threshold_ms) {
            metrics::counter!("article_query_slow_total").increment(1);
            warn!(
                event = "article_query_slow",
                duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                threshold_ms = self.config.slow_query_threshold_ms,
                limit,
                "Latest articles query exceeded its latency budget"
            );
        }

        match &result {
            Ok(articles) => debug!(count = articles.len(), limit, "Fetched latest articles"),
            Err(e) => {
                let cause = e.cause_detail().unwrap_or_else(|| "none".to_string());
                error!(
                    kind = %e.kind,
                    cause = %cause,
                    occurred_at = %e.occurred_at,
                    "Failed to fetch latest articles: {}",
                    e.message
                );
            }
        }

        result
    }

    async fn get_default_latest_articles(&self) -> Result<Vec<Article>, ArticleError> {
        self.get_latest_articles(self.config.default_limit).await
    }

    async fn storage_reachable(&self) -> bool {
        match self.reader.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database ping failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ArticleRow;
    use crate::services::article_service::ArticleErrorKind;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DbErr, RuntimeErr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubReader {
        rows: Vec<ArticleRow>,
        fail_with_connection_error: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArticleReader for StubReader {
        async fn latest_articles(&self, limit: u64) -> Result<Vec<ArticleRow>, DbErr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_connection_error {
                return Err(DbErr::Conn(RuntimeErr::Internal(
                    "connection refused".to_string(),
                )));
            }
            let limit = usize::try_from(limit).unwrap();
            Ok(self.rows.iter().take(limit).cloned().collect())
        }

        async fn ping(&self) -> Result<(), DbErr> {
            if self.fail_with_connection_error {
                Err(DbErr::Conn(RuntimeErr::Internal("down".to_string())))
            } else {
                Ok(())
            }
        }
    }

    fn row(id: i32, hour: u32, summary_len: usize) -> ArticleRow {
        ArticleRow {
            id,
            title: format!("Article {id}"),
            summary: "S".repeat(summary_len),
            published_at: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            source_url: format!("https://example.com/article{id}"),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn service(reader: Arc<StubReader>, config: ArticleQueryConfig) -> DefaultArticleService {
        DefaultArticleService::new(reader, config)
    }

    #[tokio::test]
    async fn rejects_non_positive_limit_without_touching_storage() {
        let reader = Arc::new(StubReader::default());
        let svc = service(reader.clone(), ArticleQueryConfig::default());

        for limit in [0, -1, -100] {
            let err = svc.get_latest_articles(limit).await.unwrap_err();
            assert_eq!(err.kind, ArticleErrorKind::Validation);
        }

        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_limit_above_max() {
        let reader = Arc::new(StubReader::default());
        let svc = service(reader, ArticleQueryConfig::default());

        let err = svc.get_latest_articles(51).await.unwrap_err();
        assert_eq!(err.kind, ArticleErrorKind::Validation);
    }

    #[tokio::test]
    async fn connection_failure_is_storage_unavailable() {
        let reader = Arc::new(StubReader {
            fail_with_connection_error: true,
            ..Default::default()
        });
        let svc = service(reader.clone(), ArticleQueryConfig::default());

        let err = svc.get_latest_articles(5).await.unwrap_err();
        assert_eq!(err.kind, ArticleErrorKind::StorageUnavailable);
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1, "no internal retry");
        assert!(!svc.storage_reachable().await);
    }

    #[tokio::test]
    async fn malformed_row_is_internal_error() {
        let mut bad = row(1, 10, 10);
        bad.source_url = "::not a url::".to_string();
        let reader = Arc::new(StubReader {
            rows: vec![bad],
            ..Default::default()
        });
        let svc = service(reader, ArticleQueryConfig::default());

        let err = svc.get_latest_articles(5).await.unwrap_err();
        assert_eq!(err.kind, ArticleErrorKind::Internal);
    }

    #[tokio::test]
    async fn formats_rows_in_storage_order() {
        let reader = Arc::new(StubReader {
            rows: vec![row(3, 12, 150), row(2, 11, 80), row(1, 10, 200)],
            ..Default::default()
        });
        let svc = service(reader, ArticleQueryConfig::default());

        let articles = svc.get_latest_articles(2).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, 3);
        assert_eq!(articles[0].published_at, "2024-01-15T12:00:00Z");
        assert_eq!(articles[0].summary_truncated.chars().count(), 103);
        assert_eq!(articles[1].summary_truncated.chars().count(), 80);
        assert!(!articles[1].summary_truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn default_limit_comes_from_config() {
        let rows = (1..=8).rev().map(|id| row(id, 10, 10)).collect();
        let reader = Arc::new(StubReader {
            rows,
            ..Default::default()
        });
        let config = ArticleQueryConfig {
            default_limit: 3,
            ..Default::default()
        };
        let svc = service(reader, config);

        assert_eq!(svc.get_default_latest_articles().await.unwrap().len(), 3);
    }

    async fn slow_counter_after_one_call(threshold_ms: u64) -> (usize, String) {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let reader = Arc::new(StubReader {
            rows: vec![row(1, 10, 10)],
            ..Default::default()
        });
        let config = ArticleQueryConfig {
            slow_query_threshold_ms: threshold_ms,
            ..Default::default()
        };
        let svc = service(reader, config);

        let count = svc.get_latest_articles(5).await.unwrap().len();
        (count, handle.render())
    }

    #[tokio::test]
    async fn slow_query_is_counted_and_still_succeeds() {
        let (count, rendered) = slow_counter_after_one_call(0).await;

        assert_eq!(count, 1);
        assert!(
            rendered.contains("article_query_slow_total 1"),
            "{rendered}"
        );
        assert!(rendered.contains("article_query_duration_seconds"));
    }

    #[tokio::test]
    async fn fast_query_is_not_counted_as_slow() {
        let (count, rendered) = slow_counter_after_one_call(60_000).await;

        assert_eq!(count, 1);
        assert!(!rendered.contains("article_query_slow_total"), "{rendered}");
        assert!(rendered.contains("article_query_duration_seconds"));
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let reader = Arc::new(StubReader {
            rows: vec![row(2, 11, 120), row(1, 10, 20)],
            ..Default::default()
        });
        let svc = service(reader, ArticleQueryConfig::default());

        let first = svc.get_latest_articles(5).await.unwrap();
        let second = svc.get_latest_articles(5).await.unwrap();
        assert_eq!(first, second);
        assert!(svc.storage_reachable().await);
    }

    #[test]
    fn budget_is_exclusive() {
        assert!(!exceeds_budget(Duration::from_millis(50), 50));
        assert!(exceeds_budget(Duration::from_millis(51), 50));
        assert!(exceeds_budget(Duration::from_micros(1), 0));
    }
}
