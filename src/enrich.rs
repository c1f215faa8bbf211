//! Avatar-URL enrichment over the target's public profile pages.
//!
//! A scraped record's profile picture is not exposed in the accessibility
//! tree; it is recovered from the public web profile instead. The fetch is
//! strictly best-effort: any network, status or parse miss yields no URL
//! and must never fail the surrounding scrape.

use crate::config::EnrichmentConfig;
use crate::errors::AutomationError;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument, warn};

static IMG_PREVIEW_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="img-preview">(.*?)</div>"#).expect("static pattern")
});

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]*\bsrc="([^"]+)""#).expect("static pattern"));

/// Extract the avatar URL from a profile page body: the first
/// `<img src="…">` inside the first `img-preview` block, with any query
/// string stripped. Any miss yields `None`.
pub fn extract_avatar_url(html: &str) -> Option<String> {
    let block = IMG_PREVIEW_BLOCK.captures(html)?.get(1)?.as_str();
    let src = IMG_SRC.captures(block)?.get(1)?.as_str();
    let bare = src.split('?').next().unwrap_or(src);
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

/// Rate-limited fetcher for public profile pages
pub struct AvatarFetcher {
    config: EnrichmentConfig,
    client: reqwest::Client,
    last_fetch: tokio::sync::Mutex<Option<Instant>>,
}

impl AvatarFetcher {
    pub fn new(config: EnrichmentConfig) -> Result<Self, AutomationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                AutomationError::PlatformError(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            config,
            client,
            last_fetch: tokio::sync::Mutex::new(None),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fetch the avatar URL for a user id. `None` on any failure: a
    /// disabled fetcher, a non-success status, or a page without the
    /// expected preview block.
    #[instrument(level = "debug", skip(self))]
    pub async fn avatar_url(&self, user_id: &str) -> Option<String> {
        if !self.config.enabled || user_id.is_empty() {
            return None;
        }
        self.throttle().await;

        let url = format!(
            "{}/user/{}",
            self.config.profile_host.trim_end_matches('/'),
            urlencoding::encode(user_id)
        );
        debug!("Fetching profile page: {url}");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Profile fetch failed for {user_id}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(
                "Profile fetch for {user_id} returned status {}",
                response.status()
            );
            return None;
        }
        let body = response.text().await.ok()?;
        extract_avatar_url(&body)
    }

    async fn throttle(&self) {
        let mut last = self.last_fetch.lock().await;
        if let Some(previous) = *last {
            let min_interval = self.config.min_interval();
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_url_and_strips_query_string() {
        let html = r#"<html><body>
            <div class="img-preview"><img src="https://x/y.jpg?a=1"></div>
        </body></html>"#;
        assert_eq!(extract_avatar_url(html), Some("https://x/y.jpg".to_string()));
    }

    #[test]
    fn test_takes_first_block_and_first_img() {
        let html = r#"
            <div class="img-preview"><span></span><img src="https://x/first.png"><img src="https://x/second.png"></div>
            <div class="img-preview"><img src="https://x/other.png"></div>
        "#;
        assert_eq!(
            extract_avatar_url(html),
            Some("https://x/first.png".to_string())
        );
    }

    #[test]
    fn test_missing_block_or_img_yields_none() {
        assert_eq!(extract_avatar_url("<html><body>nothing</body></html>"), None);
        assert_eq!(
            extract_avatar_url(r#"<div class="img-preview">no image here</div>"#),
            None
        );
        assert_eq!(extract_avatar_url(""), None);
    }

    #[test]
    fn test_multiline_block() {
        let html = "<div class=\"img-preview\">\n  <img\n src=\"https://cdn/av.webp?sign=abc&x=1\">\n</div>";
        assert_eq!(
            extract_avatar_url(html),
            Some("https://cdn/av.webp".to_string())
        );
    }
}
