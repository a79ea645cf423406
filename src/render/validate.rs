use crate::models::article::Article;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardValidationError {
    #[error("article record must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a string")]
    NotAString(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("id must be a positive integer")]
    InvalidId,
}

/// Checks a typed record before it is handed to a card.
pub fn validate_article(article: &Article) -> Result<(), CardValidationError> {
    if article.id <= 0 {
        return Err(CardValidationError::InvalidId);
    }

    let required = [
        ("title", &article.title),
        ("published_at", &article.published_at),
        ("source_url", &article.source_url),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(CardValidationError::EmptyField(name));
        }
    }

    Ok(())
}

fn text_field(
    object: &serde_json::Map<String, Value>,
    name: &'static str,
) -> Result<String, CardValidationError> {
    object
        .get(name)
        .ok_or(CardValidationError::MissingField(name))?
        .as_str()
        .map(ToString::to_string)
        .ok_or(CardValidationError::NotAString(name))
}

/// Validates an untyped record, e.g. one element of the latest-articles
/// response, and converts it into an [`Article`].
pub fn parse_article_record(value: &Value) -> Result<Article, CardValidationError> {
    let object = value.as_object().ok_or(CardValidationError::NotAnObject)?;

    let id = object.get("id").ok_or(CardValidationError::MissingField("id"))?;
    let id = id
        .as_i64()
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or(CardValidationError::InvalidId)?;

    let article = Article {
        id,
        title: text_field(object, "title")?,
        summary_truncated: text_field(object, "summary_truncated")?,
        published_at: text_field(object, "published_at")?,
        source_url: text_field(object, "source_url")?,
    };

    validate_article(&article)?;
    Ok(article)
}
