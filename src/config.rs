use anyhow::{bail, Context, Result};
use feed_monitor_core::keywords::KeywordConfig;
use feed_monitor_core::state::DEFAULT_RETENTION_DAYS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Keyword lists shared by every report.
    #[serde(default)]
    pub baseline: KeywordConfig,
    #[serde(default)]
    pub reports: BTreeMap<String, ReportConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}
fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Items published longer ago than this are ignored. 0 disables the filter.
    #[serde(default = "default_max_item_age_days")]
    pub max_item_age_days: u32,
    #[serde(default = "default_max_issues_per_run")]
    pub max_issues_per_run: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_item_age_days: default_max_item_age_days(),
            max_issues_per_run: default_max_issues_per_run(),
        }
    }
}

fn default_threshold() -> u32 {
    3
}
fn default_max_item_age_days() -> u32 {
    7
}
fn default_max_issues_per_run() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("feed-monitor/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    /// JSON-lines file receiving issue drafts. Console output when unset.
    #[serde(default)]
    pub outbox: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub keywords: KeywordConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_feed_category")]
    pub category: String,
    /// Only fetched when extended feeds are enabled for the run.
    #[serde(default)]
    pub extended: bool,
}

fn default_feed_category() -> String {
    "general".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.reports.is_empty() {
        bail!("at least one [reports.<id>] table must be configured");
    }

    // Validate state
    if config.state.retention_days == 0 {
        bail!("state.retention_days must be > 0");
    }

    // Validate defaults
    if config.defaults.max_issues_per_run == 0 {
        bail!("defaults.max_issues_per_run must be > 0");
    }

    if config.fetch.timeout_secs == 0 {
        bail!("fetch.timeout_secs must be > 0");
    }

    check_keywords("baseline", &config.baseline)?;

    for (id, report) in &config.reports {
        if id.trim().is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            bail!("invalid report id: '{}'", id);
        }
        if report.feeds.is_empty() {
            bail!("reports.{}.feeds must contain at least one feed", id);
        }
        for feed in &report.feeds {
            if feed.url.trim().is_empty() {
                bail!("reports.{}: feed '{}' has an empty url", id, feed.name);
            }
        }
        check_keywords(&format!("reports.{}.keywords", id), &report.keywords)?;
    }

    Ok(config)
}

fn check_keywords(section: &str, keywords: &KeywordConfig) -> Result<()> {
    for (list, terms) in keywords.named_lists() {
        if terms.iter().any(|t| t.trim().is_empty()) {
            bail!("{}.{} contains a blank keyword", section, list);
        }
    }
    Ok(())
}
