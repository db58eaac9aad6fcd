mod backfill;
mod config;
mod feed;
mod notion;
mod sync;
mod thumbnail;

use anyhow::Result;

use crate::config::Config;
use crate::notion::NotionClient;

#[tokio::main]
async fn main() {
    setup_env_and_tracing();

    if let Err(e) = run().await {
        tracing::error!("Sync failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let notion = NotionClient::new(&config);

    sync::run(&config, &notion).await?;

    if config.backfill_thumbnails {
        backfill::run(&notion).await?;
    }

    Ok(())
}

pub fn setup_env_and_tracing() {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
