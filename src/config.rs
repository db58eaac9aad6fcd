use anyhow::{anyhow, Result};

pub const DEFAULT_RSS_URL: &str = "https://v2.velog.io/rss/@pigpgw";

/// Runtime configuration, read from the environment once at startup and
/// passed by reference to every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub notion_token: String,
    pub database_id: String,
    pub rss_url: String,
    pub backfill_thumbnails: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let notion_token =
            std::env::var("NOTION_TOKEN").map_err(|_| anyhow!("Missing env: NOTION_TOKEN"))?;
        let database_id =
            std::env::var("DATABASE_ID").map_err(|_| anyhow!("Missing env: DATABASE_ID"))?;

        let rss_url = std::env::var("RSS_URL").unwrap_or_else(|_| DEFAULT_RSS_URL.into());

        let backfill_thumbnails = std::env::var("BACKFILL_THUMBNAILS")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Ok(Config {
            notion_token,
            database_id,
            rss_url,
            backfill_thumbnails,
        })
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_spellings() {
        for v in ["1", "true", "TRUE", "yes", "Yes", "y", "on", "On", " true "] {
            assert!(is_truthy(v), "{v:?} should be truthy");
        }
    }

    #[test]
    fn test_falsy_spellings() {
        for v in ["", "0", "false", "no", "off", "enabled", "tru"] {
            assert!(!is_truthy(v), "{v:?} should be falsy");
        }
    }
}
