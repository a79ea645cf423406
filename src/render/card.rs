use super::format::{format_published_at, format_source_host};
use super::validate::validate_article;
use crate::models::article::Article;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt;
use std::fmt::Write as _;

const BASE_CLASS: &str = "article-card";

pub type SelectHandler = Box<dyn Fn(&Article) + Send + Sync>;

/// User input delivered to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEvent {
    Click,
    /// A key press, named like DOM `KeyboardEvent.key` values.
    KeyDown(String),
}

impl CardEvent {
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyDown(key.into())
    }
}

/// Enter and Space activate a focused card.
#[must_use]
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Space" | "Spacebar")
}

/// One article rendered as an accessible card.
///
/// The card is focusable and activatable only when a select handler is set.
pub struct ArticleCard {
    article: Article,
    class_name: Option<String>,
    on_select: Option<SelectHandler>,
}

impl fmt::Debug for ArticleCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleCard")
            .field("article", &self.article)
            .field("class_name", &self.class_name)
            .field("interactive", &self.is_interactive())
            .finish()
    }
}

impl ArticleCard {
    /// Callers are expected to run [`validate_article`] first. An invalid
    /// record panics in debug builds and is rendered as-is in release builds.
    #[must_use]
    pub fn new(article: Article) -> Self {
        debug_assert!(
            validate_article(&article).is_ok(),
            "invalid article record passed to ArticleCard: {article:?}"
        );

        Self {
            article,
            class_name: None,
            on_select: None,
        }
    }

    /// Extra classes appended after the base `article-card` class.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        self.class_name = (!class_name.trim().is_empty()).then_some(class_name);
        self
    }

    #[must_use]
    pub fn on_select<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Article) + Send + Sync + 'static,
    {
        self.on_select = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub const fn article(&self) -> &Article {
        &self.article
    }

    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.on_select.is_some()
    }

    #[must_use]
    pub fn aria_label(&self) -> String {
        format!("Article: {}", self.article.title)
    }

    #[must_use]
    pub fn display_date(&self) -> String {
        format_published_at(&self.article.published_at)
    }

    #[must_use]
    pub fn display_source(&self) -> String {
        format_source_host(&self.article.source_url)
    }

    /// Runs the select handler for a click or an activation key.
    ///
    /// Returns whether the handler was invoked.
    pub fn handle(&self, event: &CardEvent) -> bool {
        let Some(handler) = &self.on_select else {
            return false;
        };

        let activates = match event {
            CardEvent::Click => true,
            CardEvent::KeyDown(key) => is_activation_key(key),
        };

        if activates {
            handler(&self.article);
        }
        activates
    }

    fn class_attr(&self) -> String {
        match &self.class_name {
            Some(extra) => format!("{BASE_CLASS} {extra}"),
            None => BASE_CLASS.to_string(),
        }
    }

    /// Renders the card as an HTML fragment. All text is escaped.
    #[must_use]
    pub fn render(&self) -> String {
        let article = &self.article;
        let mut html = String::new();

        let _ = write!(
            html,
            r#"<article class="{}" role="article" aria-label="{}" data-article-id="{}""#,
            encode_double_quoted_attribute(&self.class_attr()),
            encode_double_quoted_attribute(&self.aria_label()),
            article.id,
        );
        if self.is_interactive() {
            html.push_str(r#" tabindex="0""#);
        }
        html.push('>');

        let _ = write!(
            html,
            r#"<h3 class="{BASE_CLASS}__title">{}</h3>"#,
            encode_text(&article.title)
        );
        let _ = write!(
            html,
            r#"<p class="{BASE_CLASS}__summary">{}</p>"#,
            encode_text(&article.summary_truncated)
        );

        let _ = write!(
            html,
            r#"<footer class="{BASE_CLASS}__meta"><time class="{BASE_CLASS}__date" datetime="{}">{}</time>"#,
            encode_double_quoted_attribute(&article.published_at),
            encode_text(&self.display_date()),
        );

        let source = self.display_source();
        if is_http_url(&article.source_url) {
            let _ = write!(
                html,
                r#"<a class="{BASE_CLASS}__source" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                encode_double_quoted_attribute(&article.source_url),
                encode_text(&source),
            );
        } else {
            let _ = write!(
                html,
                r#"<span class="{BASE_CLASS}__source">{}</span>"#,
                encode_text(&source)
            );
        }

        html.push_str("</footer></article>");
        html
    }
}

// Only http(s) links become anchors; anything else is shown as text.
fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
