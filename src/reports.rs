//! Report registry.
//!
//! Resolves a report id from the configuration into a [`Report`]: the
//! feeds to fetch and the effective keyword set (shared baseline merged
//! with the report's own lists).

use anyhow::{bail, Result};
use feed_monitor_core::keywords::KeywordConfig;

use crate::config::{Config, FeedConfig};

/// A fully resolved report, ready for one monitor run.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub threshold: u32,
    pub feeds: Vec<FeedConfig>,
    pub keywords: KeywordConfig,
}

impl Report {
    /// Feeds active for this run. Extended feeds are only included on request.
    pub fn active_feeds(&self, extended: bool) -> Vec<&FeedConfig> {
        self.feeds
            .iter()
            .filter(|feed| extended || !feed.extended)
            .collect()
    }
}

/// Resolve `report_id` against the configured registry.
pub fn resolve_report(config: &Config, report_id: &str) -> Result<Report> {
    let Some(report) = config.reports.get(report_id) else {
        let available: Vec<&str> = config.reports.keys().map(String::as_str).collect();
        bail!(
            "Unknown report: '{}'. Available: {}",
            report_id,
            available.join(", ")
        );
    };

    Ok(Report {
        id: report_id.to_string(),
        name: report.name.clone().unwrap_or_else(|| report_id.to_string()),
        threshold: report.threshold.unwrap_or(config.defaults.threshold),
        feeds: report.feeds.clone(),
        keywords: config.baseline.merge(&report.keywords),
    })
}

/// Print the configured reports as a table.
pub fn list_reports(config: &Config) -> Result<()> {
    println!(
        "{:<24} {:<32} {:>6} {:>10} {:>9}",
        "REPORT", "NAME", "FEEDS", "THRESHOLD", "KEYWORDS"
    );
    for id in config.reports.keys() {
        let report = resolve_report(config, id)?;
        let extended = report.feeds.iter().filter(|f| f.extended).count();
        let feeds = if extended > 0 {
            format!("{}+{}", report.feeds.len() - extended, extended)
        } else {
            report.feeds.len().to_string()
        };
        println!(
            "{:<24} {:<32} {:>6} {:>10} {:>9}",
            report.id,
            report.name,
            feeds,
            report.threshold,
            report.keywords.keyword_count()
        );
        if let Some(description) = config.reports[id].description.as_deref() {
            println!("  {}", description);
        }
    }
    Ok(())
}
