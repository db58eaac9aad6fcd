use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;

use std::sync::OnceLock;

/// Only the newest entries are considered on each run; older ones are
/// assumed to have been synced already.
pub const MAX_ITEMS: usize = 20;

const SUMMARY_MAX_CHARS: usize = 800;
const NO_TITLE: &str = "(no title)";

/// One feed entry normalized for the Notion database. `content_html` keeps
/// the raw entry body around so the thumbnail resolver can scan it for an
/// embedded image.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub content_html: String,
}

pub async fn fetch_items(rss_url: &str) -> Result<Vec<rss::Item>> {
    let body = reqwest::get(rss_url).await?.bytes().await?;
    let channel = rss::Channel::read_from(&body[..])?;

    tracing::info!("RSS items: {}", channel.items().len());

    Ok(channel.into_items())
}

/// Normalizes a single feed entry. Entries without a link or a pubDate
/// yield `None` without comment; a pubDate that is present but
/// unparseable is an error. Normalization happens entry by entry in the
/// sync loop, so entries ahead of a bad one have already been written
/// when it fails.
pub fn normalize(item: &rss::Item) -> Result<Option<Post>> {
    let (link, pub_date) = match (item.link(), item.pub_date()) {
        (Some(link), Some(pub_date)) => (link, pub_date),
        _ => return Ok(None),
    };

    let title = item.title().unwrap_or(NO_TITLE).to_string();
    let published = to_iso8601(pub_date)?;

    // content:encoded carries the full post body; description is the
    // short preview some feeds ship instead. An empty body counts as
    // absent.
    let content_html = item
        .content()
        .filter(|c| !c.is_empty())
        .or_else(|| item.description())
        .unwrap_or_default()
        .to_string();
    let summary = strip_html(&content_html);

    Ok(Some(Post {
        title,
        link: link.to_string(),
        published,
        summary,
        content_html,
    }))
}

/// RFC 2822 pubDate rendered as an ISO-8601 UTC instant with millisecond
/// precision, e.g. `2024-01-01T00:00:00.000Z`.
pub fn to_iso8601(pub_date: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc2822(pub_date)?;
    Ok(parsed
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string())
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
}

/// Strips markup, collapses whitespace runs and hard-truncates to the
/// summary limit. The cut is a plain character cut, not word-aware.
pub fn strip_html(html: &str) -> String {
    let no_tags = tag_regex().replace_all(html, " ");
    let collapsed = whitespace_regex().replace_all(&no_tags, " ");

    collapsed.trim().chars().take(SUMMARY_MAX_CHARS).collect()
}
