use crate::entities::articles;
use crate::models::article::NewArticle;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::articles::Model as ArticleRow;

/// Read access to stored articles.
///
/// The article service only sees this trait, so it can run against a stub
/// in tests and the pooled [`Store`] in production.
#[async_trait]
pub trait ArticleReader: Send + Sync {
    /// Returns at most `limit` rows ordered by `published_at` desc, then `id` desc.
    async fn latest_articles(&self, limit: u64) -> Result<Vec<ArticleRow>, DbErr>;

    /// Round-trips a trivial statement to the database.
    async fn ping(&self) -> Result<(), DbErr>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn article_repo(&self) -> repositories::article::ArticleRepository {
        repositories::article::ArticleRepository::new(self.conn.clone())
    }

    pub async fn latest_articles(&self, limit: u64) -> Result<Vec<articles::Model>, DbErr> {
        self.article_repo().latest(limit).await
    }

    /// Inserts a row. A `source_url` that already exists fails with a
    /// unique-constraint violation.
    pub async fn insert_article(&self, article: &NewArticle) -> Result<i32, DbErr> {
        self.article_repo().insert(article).await
    }

    pub async fn count_articles(&self) -> Result<u64, DbErr> {
        self.article_repo().count().await
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleReader for Store {
    async fn latest_articles(&self, limit: u64) -> Result<Vec<ArticleRow>, DbErr> {
        Self::latest_articles(self, limit).await
    }

    async fn ping(&self) -> Result<(), DbErr> {
        Self::ping(self).await
    }
}
