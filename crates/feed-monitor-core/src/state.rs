//! Processed-item state.
//!
//! A [`State`] records which feed items a report has already surfaced, keyed
//! by a truncated SHA-256 of the item link. It is an owned value scoped to a
//! single run: load it from a [`StateStore`](crate::store::StateStore),
//! filter, record, prune, then save it back.
//!
//! Functions that read the clock have an `_at` variant taking `now`
//! explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Tracked;

/// Hex characters kept from the SHA-256 digest.
pub const HASH_LEN: usize = 16;

/// Default retention window, matching the issue tracker's own window.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// First-seen metadata for one processed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    pub added_at: DateTime<Utc>,
    pub title: String,
}

/// Persistent dedup record for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub report_id: String,
    #[serde(default)]
    pub processed_items: BTreeMap<String, ProcessedEntry>,
    pub last_run_at: DateTime<Utc>,
}

impl State {
    /// A fresh, empty state for `report_id`.
    pub fn new(report_id: &str) -> Self {
        Self::new_at(report_id, Utc::now())
    }

    pub fn new_at(report_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            report_id: report_id.to_string(),
            processed_items: BTreeMap::new(),
            last_run_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.processed_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed_items.is_empty()
    }

    /// Whether an item with this hash has already been processed.
    pub fn contains(&self, hash: &str) -> bool {
        self.processed_items.contains_key(hash)
    }
}

/// Content-addressed identity of a feed item, derived from its link.
///
/// Falls back to link + title only when the link is empty.
pub fn item_hash<T: Tracked + ?Sized>(item: &T) -> String {
    let item = item.feed_item();
    let mut hasher = Sha256::new();
    hasher.update(item.link.as_bytes());
    if item.link.is_empty() {
        hasher.update(item.title.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..HASH_LEN].to_string()
}

/// Items whose hash is not yet tracked in `state`, in input order.
pub fn filter_new<T: Tracked + Clone>(items: &[T], state: &State) -> Vec<T> {
    items
        .iter()
        .filter(|item| !state.contains(&item_hash(*item)))
        .cloned()
        .collect()
}

/// Record `items` as processed now. Re-recording refreshes the timestamp.
pub fn record_processed<T: Tracked>(items: &[T], state: &mut State) {
    record_processed_at(items, state, Utc::now());
}

pub fn record_processed_at<T: Tracked>(items: &[T], state: &mut State, now: DateTime<Utc>) {
    for item in items {
        state.processed_items.insert(
            item_hash(item),
            ProcessedEntry {
                added_at: now,
                title: item.feed_item().title.clone(),
            },
        );
    }
}

/// Drop entries older than `max_age_days`. Returns the number removed.
pub fn prune(state: &mut State, max_age_days: u32) -> usize {
    prune_at(state, max_age_days, Utc::now())
}

pub fn prune_at(state: &mut State, max_age_days: u32, now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(i64::from(max_age_days));
    let before = state.processed_items.len();
    state
        .processed_items
        .retain(|_, entry| entry.added_at >= cutoff);
    before - state.processed_items.len()
}
