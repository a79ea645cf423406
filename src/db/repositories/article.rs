use crate::entities::{articles, prelude::*};
use crate::models::article::NewArticle;
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
};

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest first; equal timestamps fall back to the higher id.
    pub async fn latest(&self, limit: u64) -> Result<Vec<articles::Model>, DbErr> {
        Articles::find()
            .order_by_desc(articles::Column::PublishedAt)
            .order_by_desc(articles::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
    }

    pub async fn insert(&self, article: &NewArticle) -> Result<i32, DbErr> {
        let active_model = articles::ActiveModel {
            title: Set(article.title.clone()),
            summary: Set(article.summary.clone()),
            published_at: Set(article.published_at),
            source_url: Set(article.source_url.clone()),
            ..Default::default()
        };

        let result = Articles::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Articles::find().count(&self.conn).await
    }
}
