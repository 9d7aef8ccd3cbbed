//! Feed connector.
//!
//! Downloads RSS/Atom documents over HTTP(S) with `reqwest` and parses them
//! with [`parse_feed`](crate::feed::parse_feed). `file://` URLs are read
//! from the local filesystem, which is handy for mirrors and fixtures.
//!
//! # Configuration
//!
//! ```toml
//! [fetch]
//! timeout_secs = 30
//! user_agent = "feed-monitor/0.1"
//!
//! [[reports.vercel-aws.feeds]]
//! name = "AWS News"
//! url = "https://aws.amazon.com/blogs/aws/feed/"
//! category = "aws"
//! extended = false
//! ```

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use feed_monitor_core::models::FeedItem;
use tracing::{debug, warn};

use crate::config::{FeedConfig, FetchConfig};
use crate::feed::parse_feed;
use crate::traits::FeedSource;

/// A [`FeedSource`] backed by HTTP(S) and `file://` URLs.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> Result<String> {
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read feed file: {}", path));
        }

        let resp = self
            .client
            .get(url)
            .header(
                "Accept",
                "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
            )
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, feed: &FeedConfig) -> Result<Vec<FeedItem>> {
        let body = self.download(&feed.url).await?;
        parse_feed(&body, feed).with_context(|| format!("Failed to parse feed '{}'", feed.name))
    }
}

/// Fetch every feed in turn, skipping (with a warning) any that fail.
pub async fn fetch_all(source: &dyn FeedSource, feeds: &[&FeedConfig]) -> Vec<FeedItem> {
    let mut items = Vec::new();
    for feed in feeds {
        match source.fetch(feed).await {
            Ok(fetched) => {
                debug!(feed = %feed.name, count = fetched.len(), "fetched feed");
                items.extend(fetched);
            }
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(feed = %feed.name, url = %feed.url, %error, "skipping feed");
            }
        }
    }
    items
}
