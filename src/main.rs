//! # Feed Monitor CLI (`feed-monitor`)
//!
//! Runs one monitoring pass for a report: fetches its feeds, scores every
//! item, skips items already processed in earlier runs, notifies the rest,
//! and persists the dedup state.
//!
//! ## Usage
//!
//! ```bash
//! feed-monitor --config ./config/feed-monitor.toml --report=<id> [options]
//! ```
//!
//! ## Options
//!
//! | Flag | Env | Description |
//! |------|-----|-------------|
//! | `--report=<id>` | `FEED_MONITOR_REPORT` | Report to run |
//! | `--dry-run` | `DRY_RUN` (`1`/`true`/`yes`/`on`) | Score and dedup only; notify nothing, save nothing |
//! | `--threshold=<n>` | | Override the report's relevance threshold |
//! | `--extended-feeds` | `EXTENDED_FEEDS` | Also fetch feeds marked `extended` |
//! | `--list-reports` | | Print configured reports and exit |
//! | `--state-dir <path>` | | Override `[state].dir` |
//! | `--outbox <path>` | | Write issue drafts as JSON lines instead of printing |
//!
//! Diagnostics go to stderr (filter with `RUST_LOG`); the run summary goes
//! to stdout. Exits non-zero on an unknown report, invalid config, or a
//! state save failure.

use std::path::PathBuf;

use anyhow::bail;
use clap::builder::BoolishValueParser;
use clap::Parser;
use feed_monitor::config;
use feed_monitor::connector_feed::HttpFeedSource;
use feed_monitor::monitor::{self, RunOptions};
use feed_monitor::notify::{ConsoleNotifier, OutboxNotifier};
use feed_monitor::reports;
use feed_monitor::state_store::JsonStateStore;
use feed_monitor::traits::Notifier;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Feed Monitor — scores RSS/Atom feed items for report relevance and
/// files deduplicated tracking issues.
#[derive(Parser)]
#[command(
    name = "feed-monitor",
    about = "Feed Monitor — scores RSS/Atom feed items for report relevance and files deduplicated tracking issues",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, default_value = "./config/feed-monitor.toml")]
    config: PathBuf,

    /// Report id to run (see `--list-reports`).
    #[arg(long, env = "FEED_MONITOR_REPORT")]
    report: Option<String>,

    /// Dry run — show what would be filed without notifying or saving state.
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// Minimum relevance score, overriding the report's threshold.
    #[arg(long)]
    threshold: Option<u32>,

    /// List configured reports and exit.
    #[arg(long)]
    list_reports: bool,

    /// Include feeds marked `extended = true`.
    #[arg(long, env = "EXTENDED_FEEDS", value_parser = BoolishValueParser::new())]
    extended_feeds: bool,

    /// Directory holding per-report state files. Overrides `[state].dir`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Append issue drafts to this JSON-lines file. Overrides `[notify].outbox`.
    #[arg(long)]
    outbox: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed_monitor=info,feed_monitor_core=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = config::load_config(&cli.config)?;

    if cli.list_reports {
        reports::list_reports(&cfg)?;
        return Ok(());
    }

    let Some(report_id) = cli.report else {
        bail!("missing --report=<id> (use --list-reports to see configured reports)");
    };

    if let Some(dir) = cli.state_dir {
        cfg.state.dir = dir;
    }

    let notifier: Box<dyn Notifier> = match cli.outbox.or_else(|| cfg.notify.outbox.clone()) {
        Some(path) => Box::new(OutboxNotifier::new(path)),
        None => Box::new(ConsoleNotifier),
    };
    let source = HttpFeedSource::new(&cfg.fetch)?;
    let store = JsonStateStore::new(&cfg.state.dir);

    let options = RunOptions {
        dry_run: cli.dry_run,
        threshold: cli.threshold,
        extended_feeds: cli.extended_feeds,
    };

    let summary = monitor::run_monitor(
        &cfg,
        &report_id,
        &options,
        &source,
        notifier.as_ref(),
        &store,
    )
    .await?;
    monitor::print_summary(&summary);

    Ok(())
}
