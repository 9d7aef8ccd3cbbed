//! Extension traits for feed sources and notifiers.
//!
//! The monitor pipeline talks to the outside world through two seams:
//!
//! ```text
//!   FeedSource ──▶ score ──▶ dedup ──▶ Notifier
//!   (HTTP/file)                        (console/outbox/custom)
//! ```
//!
//! Built-in implementations live in [`connector_feed`](crate::connector_feed)
//! and [`notify`](crate::notify). Implement these traits to plug in other
//! transports, such as a cached feed mirror or an issue tracker client.

use anyhow::Result;
use async_trait::async_trait;
use feed_monitor_core::models::FeedItem;

use crate::config::FeedConfig;
use crate::notify::IssueDraft;

/// Produces feed items for one configured feed.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use feed_monitor::config::FeedConfig;
/// use feed_monitor::traits::FeedSource;
/// use feed_monitor_core::models::FeedItem;
///
/// struct EmptySource;
///
/// #[async_trait]
/// impl FeedSource for EmptySource {
///     async fn fetch(&self, _feed: &FeedConfig) -> Result<Vec<FeedItem>> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse `feed`, returning its items in document order.
    ///
    /// An error here only skips this feed; the run continues.
    async fn fetch(&self, feed: &FeedConfig) -> Result<Vec<FeedItem>>;
}

/// Delivers an issue draft for a newly relevant item.
///
/// An item is recorded as processed only after `notify` returns `Ok`, so a
/// failed delivery is retried on the next run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short identifier used in logs (e.g. `"console"`, `"outbox"`).
    fn name(&self) -> &str;

    async fn notify(&self, draft: &IssueDraft) -> Result<()>;
}
