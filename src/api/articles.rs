//! Article API endpoints.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use std::sync::Arc;

use super::{ApiError, AppState, LatestArticlesQuery};
use crate::models::article::Article;

/// Returns the most recent articles, newest first.
///
/// # Endpoint
/// `GET /api/articles/latest[?limit=N]`
///
/// Without `limit` the configured default is used.
pub async fn get_latest_articles(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LatestArticlesQuery>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;

    let articles = match query.limit {
        Some(limit) => state.article_service.get_latest_articles(limit).await?,
        None => state.article_service.get_default_latest_articles().await?,
    };

    Ok(Json(articles))
}
