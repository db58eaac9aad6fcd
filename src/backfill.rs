use anyhow::Result;

use crate::notion::NotionClient;
use crate::thumbnail;

/// Walks every database page with an empty Thumbnail and tries to scrape
/// one from the page's own Link. Runs the feed sync's article-page
/// resolution only; the original feed content is long gone by now.
pub async fn run(notion: &NotionClient) -> Result<()> {
    let http = reqwest::Client::new();

    let mut cursor: Option<String> = None;
    let mut updated = 0usize;

    loop {
        let (pages, next_cursor) = notion.pages_missing_thumbnail(cursor.as_deref()).await?;

        for page in pages {
            let resolved = match page.link.as_deref() {
                Some(link) => thumbnail::resolve_from_page(&http, link).await,
                None => None,
            };

            match resolved {
                Some(src) => {
                    let proxied = thumbnail::proxy_url(&src);
                    notion.update_thumbnail(&page.id, &proxied).await?;
                    updated += 1;
                    tracing::info!("thumb: {}", page.title);
                }
                None => tracing::info!("no thumb: {}", page.title),
            }
        }

        match next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::info!("backfill done: {} thumbnails added", updated);

    Ok(())
}
