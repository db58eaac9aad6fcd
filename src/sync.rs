use anyhow::Result;

use crate::config::Config;
use crate::feed;
use crate::notion::NotionClient;
use crate::thumbnail;

/// One sync pass: fetch the feed, then for each entry normalize, check
/// the database by link and create a page when it is not yet there.
/// Entries are processed strictly one at a time — a failure, including a
/// bad pubDate, aborts the run but leaves the creates made for entries
/// ahead of it in place.
pub async fn run(config: &Config, notion: &NotionClient) -> Result<()> {
    let http = reqwest::Client::new();

    let items = feed::fetch_items(&config.rss_url).await?;

    let mut added = 0usize;
    let mut skipped = 0usize;
    for item in items.iter().take(feed::MAX_ITEMS) {
        let post = match feed::normalize(item)? {
            Some(post) => post,
            None => continue,
        };

        if notion.exists_by_link(&post.link).await? {
            tracing::info!("skip: {}", post.title);
            skipped += 1;
            continue;
        }

        let thumbnail = thumbnail::resolve(&http, &post.content_html, &post.link).await;

        notion.create_post(&post, thumbnail.as_deref()).await?;
        added += 1;

        match thumbnail {
            Some(_) => tracing::info!("added: {}", post.title),
            None => tracing::info!("added (no thumb): {}", post.title),
        }
    }

    tracing::info!("sync done: {} added, {} skipped", added, skipped);

    Ok(())
}
