//! # Feed Monitor
//!
//! Watches RSS/Atom feeds for items relevant to a comparison report,
//! scores them against the report's keyword lists, suppresses items seen
//! in earlier runs, and hands the rest to a notifier for issue filing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐   ┌──────────┐
//! │ FeedSource  │──▶│ Keyword      │──▶│ State store │──▶│ Notifier │
//! │ HTTP / file │   │ scorer       │   │ dedup+prune │   │ console/ │
//! └─────────────┘   └──────────────┘   └─────────────┘   │ outbox   │
//!                                                        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! feed-monitor --list-reports
//! feed-monitor --report=vercel-aws --dry-run
//! feed-monitor --report=vercel-aws --threshold=4
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`reports`] | Report registry and keyword merging |
//! | [`feed`] | RSS/Atom parsing |
//! | [`connector_feed`] | Feed fetching |
//! | [`state_store`] | JSON file state store |
//! | [`notify`] | Issue drafts and notifiers |
//! | [`monitor`] | Run orchestration |
//! | [`traits`] | `FeedSource` and `Notifier` extension traits |
//!
//! Scoring and state logic live in the `feed-monitor-core` crate.

pub mod config;
pub mod connector_feed;
pub mod feed;
pub mod monitor;
pub mod notify;
pub mod reports;
pub mod state_store;
pub mod traits;
