//! JSON file [`StateStore`].
//!
//! Keeps one pretty-printed JSON record per report under an explicit root
//! directory:
//!
//! ```text
//! <root>/<report_id>.json
//! {
//!   "reportId": "vercel-aws",
//!   "processedItems": {
//!     "3f2a9c0b1d4e5f60": { "addedAt": "2025-10-14T16:00:00Z", "title": "..." }
//!   },
//!   "lastRunAt": "2025-10-14T16:05:00Z"
//! }
//! ```
//!
//! Records are written to a sibling temp file and renamed into place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use feed_monitor_core::state::State;
use feed_monitor_core::store::StateStore;
use tracing::{debug, info, warn};

/// Stores each report's state as `<root>/<report_id>.json`.
pub struct JsonStateStore {
    root: PathBuf,
}

impl JsonStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `report_id`.
    pub fn record_path(&self, report_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", report_id))
    }
}

impl StateStore for JsonStateStore {
    fn load(&self, report_id: &str) -> State {
        let path = self.record_path(report_id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(report = report_id, path = %path.display(), "no existing state, starting fresh");
                return State::new(report_id);
            }
            Err(e) => {
                warn!(report = report_id, path = %path.display(), error = %e, "failed to read state, starting fresh");
                return State::new(report_id);
            }
        };

        match serde_json::from_str::<State>(&raw) {
            Ok(state) if state.report_id == report_id => {
                debug!(report = report_id, entries = state.len(), "loaded state");
                state
            }
            Ok(state) => {
                warn!(
                    report = report_id,
                    stored = %state.report_id,
                    "state report id mismatch, starting fresh"
                );
                State::new(report_id)
            }
            Err(e) => {
                warn!(report = report_id, path = %path.display(), error = %e, "failed to parse state, starting fresh");
                State::new(report_id)
            }
        }
    }

    fn save(&self, state: &mut State) -> Result<()> {
        state.last_run_at = Utc::now();

        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create state directory: {}", self.root.display())
        })?;

        let path = self.record_path(&state.report_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        debug!(report = %state.report_id, entries = state.len(), path = %path.display(), "saved state");
        Ok(())
    }
}
