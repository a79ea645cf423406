//! Latest articles command handler

use crate::config::Config;
use crate::db::Store;
use crate::render::{format_published_at, format_source_host};
use crate::services::{ArticleService, DefaultArticleService};
use std::sync::Arc;

pub async fn cmd_latest(config: &Config, limit: Option<i64>, json: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_url).await?;
    let service = DefaultArticleService::new(Arc::new(store), config.articles.clone());

    let articles = match limit {
        Some(limit) => service.get_latest_articles(limit).await?,
        None => service.get_default_latest_articles().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles available yet.");
        return Ok(());
    }

    println!("Latest Articles ({} shown)", articles.len());
    println!("{:-<70}", "");

    for article in articles {
        println!("• {}", article.title);
        println!(
            "  {} | {}",
            format_published_at(&article.published_at),
            format_source_host(&article.source_url)
        );
        println!("  {}", article.summary_truncated);
        println!();
    }

    Ok(())
}
