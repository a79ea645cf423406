//! Database connectivity check

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_url).await?;

    match store.ping().await {
        Ok(()) => {
            let count = store.count_articles().await?;
            println!("✓ Database reachable ({count} articles stored)");
            Ok(())
        }
        Err(e) => {
            println!("✗ Database unreachable: {e}");
            Err(e.into())
        }
    }
}
