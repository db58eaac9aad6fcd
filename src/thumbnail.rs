use regex::Regex;
use reqwest::Client;

const IMAGE_PROXY_BASE: &str = "https://images.weserv.nl/?url=";

/// Best-effort thumbnail resolution for a feed entry: an image embedded in
/// the entry body wins, otherwise the article page itself is scraped.
/// Returns the proxied URL, or `None` when nothing usable turns up.
pub async fn resolve(client: &Client, content_html: &str, article_url: &str) -> Option<String> {
    let raw = match extract_img_src(content_html) {
        Some(src) => Some(src),
        None => resolve_from_page(client, article_url).await,
    };

    raw.map(|src| proxy_url(&src))
}

/// Scrapes the article page for an og:image meta tag, falling back to the
/// first img tag. Any network or parse failure yields `None`.
pub async fn resolve_from_page(client: &Client, url: &str) -> Option<String> {
    let response = client.get(url).send().await.ok()?;
    let html = response.text().await.ok()?;

    extract_og_image(&html).or_else(|| extract_img_src(&html))
}

/// First `<img src=...>` occurrence, unvalidated.
pub fn extract_img_src(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).ok()?;

    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_og_image(html: &str) -> Option<String> {
    // Both attribute orders show up in the wild.
    let patterns = [
        r#"<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#,
        r#"<meta[^>]+content=["']([^"']+)["'][^>]+property=["']og:image["']"#,
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(html) {
            if let Some(url) = caps.get(1) {
                return Some(url.as_str().to_string());
            }
        }
    }

    None
}

/// Notion often refuses to render hotlinked images, so every candidate is
/// routed through the weserv image proxy with its scheme stripped.
pub fn proxy_url(raw: &str) -> String {
    let stripped = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);

    format!("{}{}", IMAGE_PROXY_BASE, urlencoding::encode(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_img_src_first_match_wins() {
        let html = r#"<p>x</p><img alt="a" src="https://cdn/a.png"><img src="https://cdn/b.png">"#;
        assert_eq!(
            extract_img_src(html),
            Some("https://cdn/a.png".to_string())
        );
        assert_eq!(extract_img_src("<p>no image</p>"), None);
    }

    #[test]
    fn test_extract_og_image_both_orders() {
        let forward = r#"<head><meta property="og:image" content="https://cdn/og.png"></head>"#;
        assert_eq!(
            extract_og_image(forward),
            Some("https://cdn/og.png".to_string())
        );

        let reversed = r#"<head><meta content="https://cdn/og2.png" property="og:image"></head>"#;
        assert_eq!(
            extract_og_image(reversed),
            Some("https://cdn/og2.png".to_string())
        );
    }

    #[test]
    fn test_og_image_falls_back_to_img_tag() {
        let html = r#"<body><img src='https://cdn/inline.jpg'></body>"#;
        assert_eq!(extract_og_image(html), None);
        assert_eq!(
            extract_og_image(html).or_else(|| extract_img_src(html)),
            Some("https://cdn/inline.jpg".to_string())
        );
    }

    #[test]
    fn test_proxy_url_strips_scheme_and_encodes() {
        assert_eq!(
            proxy_url("http://example.com/a.png"),
            "https://images.weserv.nl/?url=example.com%2Fa.png"
        );
        assert_eq!(
            proxy_url("https://example.com/a.png"),
            "https://images.weserv.nl/?url=example.com%2Fa.png"
        );
        // No scheme: passed through as-is before encoding.
        assert_eq!(
            proxy_url("example.com/a.png"),
            "https://images.weserv.nl/?url=example.com%2Fa.png"
        );
    }
}
