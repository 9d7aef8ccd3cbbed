//! Monitor run orchestration.
//!
//! Coordinates one pass for a report: fetch → age filter → score →
//! threshold → dedup (state and in-batch) → notify → record → prune → save. Feed and
//! notification failures are non-fatal; a state save failure aborts the
//! run, since losing the dedup record would re-notify every item next time.

use anyhow::Result;
use chrono::{Duration, Utc};
use feed_monitor_core::keywords::{item_text, score};
use feed_monitor_core::models::{FeedItem, RelevantItem};
use feed_monitor_core::state::{filter_new, item_hash, prune, record_processed};
use feed_monitor_core::store::StateStore;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connector_feed::fetch_all;
use crate::notify::IssueDraft;
use crate::reports::{resolve_report, Report};
use crate::traits::{FeedSource, Notifier};

/// Per-run switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Overrides the report's threshold.
    pub threshold: Option<u32>,
    pub extended_feeds: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub report_id: String,
    pub dry_run: bool,
    pub feeds: usize,
    pub fetched: usize,
    pub too_old: usize,
    pub relevant: usize,
    pub skipped: usize,
    /// Same link seen in more than one feed this run.
    pub duplicates: usize,
    pub new: usize,
    pub deferred: usize,
    pub notified: usize,
    pub failed: usize,
    pub pruned: usize,
    pub tracked: usize,
}

/// Run the monitor for `report_id`.
pub async fn run_monitor(
    config: &Config,
    report_id: &str,
    options: &RunOptions,
    source: &dyn FeedSource,
    notifier: &dyn Notifier,
    store: &dyn StateStore,
) -> Result<RunSummary> {
    let report = resolve_report(config, report_id)?;
    let threshold = options.threshold.unwrap_or(report.threshold);
    let mut summary = RunSummary {
        report_id: report.id.clone(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    let feeds = report.active_feeds(options.extended_feeds);
    summary.feeds = feeds.len();
    info!(report = %report.id, feeds = feeds.len(), threshold, "starting run");

    let mut items = fetch_all(source, &feeds).await;
    summary.fetched = items.len();

    if config.defaults.max_item_age_days > 0 {
        let cutoff = Utc::now() - Duration::days(i64::from(config.defaults.max_item_age_days));
        items.retain(|item| item.published_at.map_or(true, |ts| ts >= cutoff));
        summary.too_old = summary.fetched - items.len();
    }

    let relevant = score_items(&report, items, threshold);
    summary.relevant = relevant.len();

    let mut state = store.load(&report.id);
    let mut fresh = filter_new(&relevant, &state);
    summary.skipped = relevant.len() - fresh.len();

    // Highest score wins since `relevant` is sorted.
    let mut seen = HashSet::new();
    let before = fresh.len();
    fresh.retain(|entry| seen.insert(item_hash(entry)));
    summary.duplicates = before - fresh.len();
    summary.new = fresh.len();

    let cap = config.defaults.max_issues_per_run;
    if fresh.len() > cap {
        summary.deferred = fresh.len() - cap;
        fresh.truncate(cap);
    }

    if options.dry_run {
        for relevant in &fresh {
            println!(
                "would file: [{}] {} (score {})",
                report.id, relevant.item.title, relevant.result.score
            );
        }
        summary.tracked = state.len();
        return Ok(summary);
    }

    let mut delivered = Vec::with_capacity(fresh.len());
    for relevant in fresh {
        let draft = IssueDraft::from_relevant(&report, &relevant);
        match notifier.notify(&draft).await {
            Ok(()) => {
                debug!(notifier = notifier.name(), link = %relevant.item.link, "notified");
                delivered.push(relevant);
            }
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(notifier = notifier.name(), link = %relevant.item.link, %error, "notification failed, will retry next run");
                summary.failed += 1;
            }
        }
    }
    summary.notified = delivered.len();

    record_processed(&delivered, &mut state);
    summary.pruned = prune(&mut state, config.state.retention_days);
    store.save(&mut state)?;
    summary.tracked = state.len();

    info!(
        report = %report.id,
        notified = summary.notified,
        pruned = summary.pruned,
        tracked = summary.tracked,
        "run complete"
    );
    Ok(summary)
}

/// Score items and keep those clearing `threshold`, highest score first.
pub fn score_items(report: &Report, items: Vec<FeedItem>, threshold: u32) -> Vec<RelevantItem> {
    let mut relevant: Vec<RelevantItem> = items
        .into_iter()
        .filter_map(|item| {
            let result = score(&item_text(&item), &report.keywords);
            if result.is_relevant(threshold) {
                Some(RelevantItem::new(item, result))
            } else {
                None
            }
        })
        .collect();
    relevant.sort_by(|a, b| b.result.score.cmp(&a.result.score));
    relevant
}

/// Print the run summary in the same layout as other CLI reports.
pub fn print_summary(summary: &RunSummary) {
    if summary.dry_run {
        println!("monitor {} (dry-run)", summary.report_id);
    } else {
        println!("monitor {}", summary.report_id);
    }
    println!("  feeds: {}", summary.feeds);
    println!("  items found: {}", summary.fetched);
    if summary.too_old > 0 {
        println!("  too old: {}", summary.too_old);
    }
    println!("  relevant: {}", summary.relevant);
    println!("  skipped (already processed): {}", summary.skipped);
    if summary.duplicates > 0 {
        println!("  duplicates: {}", summary.duplicates);
    }
    println!("  new: {}", summary.new);
    if summary.deferred > 0 {
        println!("  deferred to next run: {}", summary.deferred);
    }
    if !summary.dry_run {
        println!("  newly recorded: {}", summary.notified);
        if summary.failed > 0 {
            println!("  failed notifications: {}", summary.failed);
        }
        println!("  pruned: {}", summary.pruned);
    }
    println!("  tracked: {}", summary.tracked);
    println!("ok");
}
