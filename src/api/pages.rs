use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::AppState;
use crate::render;
use crate::services::ArticleErrorKind;

/// `GET /`
///
/// Server-rendered list of the latest articles as cards.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.article_service.get_default_latest_articles().await {
        Ok(articles) => Html(render::render_page(&render::render_card_list(&articles))).into_response(),
        Err(e) => {
            warn!(kind = %e.kind, "Index page rendered without articles: {}", e.message);
            let status = match e.kind {
                ArticleErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = render::render_unavailable(
                "Articles are temporarily unavailable. Please try again later.",
            );
            (status, Html(render::render_page(&body))).into_response()
        }
    }
}
