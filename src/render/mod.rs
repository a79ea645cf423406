//! Server-side rendering of article cards.

pub mod card;
pub mod format;
pub mod validate;

pub use card::{ArticleCard, CardEvent, SelectHandler, is_activation_key};
pub use format::{format_or_raw, format_published_at, format_source_host};
pub use validate::{CardValidationError, parse_article_record, validate_article};

use crate::models::article::Article;
use html_escape::encode_text;

const PAGE_TITLE: &str = "LLM Topix";

/// Renders the list of cards, or an empty-state message.
#[must_use]
pub fn render_card_list(articles: &[Article]) -> String {
    if articles.is_empty() {
        return r#"<p class="article-list__empty">No articles available yet.</p>"#.to_string();
    }

    let cards: String = articles
        .iter()
        .map(|article| ArticleCard::new(article.clone()).render())
        .collect();

    format!(r#"<section class="article-list" aria-label="Latest articles">{cards}</section>"#)
}

/// Full HTML document for the index page.
#[must_use]
pub fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{PAGE_TITLE}</title></head><body><header><h1>{PAGE_TITLE}</h1><p>Latest news on AI and large language models</p></header><main>{body}</main></body></html>"#
    )
}

/// Body shown when articles could not be loaded.
#[must_use]
pub fn render_unavailable(message: &str) -> String {
    format!(
        r#"<p class="article-list__error" role="alert">{}</p>"#,
        encode_text(message)
    )
}
