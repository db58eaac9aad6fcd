use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::feed::Post;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

const BACKFILL_PAGE_SIZE: u32 = 50;

pub struct NotionClient {
    client: Client,
    token: String,
    database_id: String,
}

/// Minimal view of an existing database page, as needed by the backfill
/// pass. `link` is `None` when the page has no Link URL set.
#[derive(Debug, Clone)]
pub struct PageRef {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
    has_more: bool,
    next_cursor: Option<String>,
}

impl NotionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            token: config.notion_token.clone(),
            database_id: config.database_id.clone(),
        }
    }

    /// True iff the database already holds a page whose Link equals `link`.
    /// This existence check is the only deduplication mechanism.
    pub async fn exists_by_link(&self, link: &str) -> Result<bool> {
        let response = self.query(link_filter_body(link)).await?;
        Ok(!response.results.is_empty())
    }

    pub async fn create_post(&self, post: &Post, thumbnail: Option<&str>) -> Result<()> {
        let url = format!("{NOTION_API_BASE}/pages");

        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&create_body(&self.database_id, post, thumbnail))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Sets only the Thumbnail property and the page cover; everything else
    /// on the page is left untouched.
    pub async fn update_thumbnail(&self, page_id: &str, thumbnail: &str) -> Result<()> {
        let url = format!("{NOTION_API_BASE}/pages/{page_id}");

        self.client
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&thumbnail_body(thumbnail))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// One page of database rows with an empty Thumbnail, plus the cursor
    /// for the next page when the database reports more.
    pub async fn pages_missing_thumbnail(
        &self,
        cursor: Option<&str>,
    ) -> Result<(Vec<PageRef>, Option<String>)> {
        let response = self.query(missing_thumbnail_body(cursor)).await?;

        let pages = response
            .results
            .iter()
            .map(page_ref_from_result)
            .collect::<Result<Vec<_>>>()?;

        let next_cursor = if response.has_more {
            response.next_cursor
        } else {
            None
        };

        Ok((pages, next_cursor))
    }

    async fn query(&self, body: Value) -> Result<QueryResponse> {
        let url = format!("{NOTION_API_BASE}/databases/{}/query", self.database_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

fn link_filter_body(link: &str) -> Value {
    json!({
        "filter": {
            "property": "Link",
            "url": { "equals": link },
        },
        "page_size": 1,
    })
}

fn missing_thumbnail_body(cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": {
            "property": "Thumbnail",
            "url": { "is_empty": true },
        },
        "page_size": BACKFILL_PAGE_SIZE,
    });

    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }

    body
}

fn create_body(database_id: &str, post: &Post, thumbnail: Option<&str>) -> Value {
    let mut body = json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": { "title": [{ "text": { "content": post.title } }] },
            "Link": { "url": post.link },
            "Published": { "date": { "start": post.published } },
            "Summary": { "rich_text": [{ "text": { "content": post.summary } }] },
        },
    });

    if let Some(thumbnail) = thumbnail {
        body["properties"]["Thumbnail"] = json!({ "url": thumbnail });
        body["cover"] = cover_value(thumbnail);
    }

    body
}

fn thumbnail_body(thumbnail: &str) -> Value {
    json!({
        "properties": {
            "Thumbnail": { "url": thumbnail },
        },
        "cover": cover_value(thumbnail),
    })
}

fn cover_value(url: &str) -> Value {
    json!({
        "type": "external",
        "external": { "url": url },
    })
}

fn page_ref_from_result(page: &Value) -> Result<PageRef> {
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .ok_or(anyhow!("Query result without page id"))?
        .to_string();

    let title = page
        .pointer("/properties/Title/title/0/plain_text")
        .and_then(Value::as_str)
        .unwrap_or("(no title)")
        .to_string();

    let link = page
        .pointer("/properties/Link/url")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(PageRef { id, title, link })
}
