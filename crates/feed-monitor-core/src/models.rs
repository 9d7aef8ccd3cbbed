//! Core data models used throughout Feed Monitor.
//!
//! These types represent the feed items and scored results that flow
//! through the monitor pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::keywords::KeywordMatchResult;

/// A single entry parsed from an RSS or Atom feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    /// Canonical identity of the item.
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Plain text, HTML stripped.
    pub description: String,
    pub source_name: String,
    pub source_category: String,
}

/// A feed item paired with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct RelevantItem {
    pub item: FeedItem,
    pub result: KeywordMatchResult,
}

impl RelevantItem {
    pub fn new(item: FeedItem, result: KeywordMatchResult) -> Self {
        Self { item, result }
    }
}

/// Anything that can be tracked in the processed-item state.
///
/// Implemented for both raw [`FeedItem`]s and scored [`RelevantItem`]s so
/// that dedup filtering works at either stage of the pipeline.
pub trait Tracked {
    fn feed_item(&self) -> &FeedItem;
}

impl Tracked for FeedItem {
    fn feed_item(&self) -> &FeedItem {
        self
    }
}

impl Tracked for RelevantItem {
    fn feed_item(&self) -> &FeedItem {
        &self.item
    }
}
