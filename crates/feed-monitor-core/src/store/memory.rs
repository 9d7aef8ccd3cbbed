//! In-memory [`StateStore`] implementation for testing and embedding.
//!
//! Records are kept serialized as JSON behind a `std::sync::RwLock`, so a
//! round trip exercises the same encoding as the on-disk store.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::warn;

use super::StateStore;
use crate::state::State;

/// In-memory state store.
pub struct InMemoryStateStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a raw record, bypassing serialization. Used to simulate
    /// corrupt or foreign records.
    pub fn insert_raw(&self, report_id: &str, raw: &str) {
        if let Ok(mut records) = self.records.write() {
            records.insert(report_id.to_string(), raw.to_string());
        }
    }

    /// Whether a record exists for `report_id`.
    pub fn contains(&self, report_id: &str) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(report_id))
            .unwrap_or(false)
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self, report_id: &str) -> State {
        let raw = match self.records.read() {
            Ok(records) => records.get(report_id).cloned(),
            Err(_) => None,
        };
        let Some(raw) = raw else {
            return State::new(report_id);
        };

        match serde_json::from_str::<State>(&raw) {
            Ok(state) if state.report_id == report_id => state,
            Ok(state) => {
                warn!(
                    report = report_id,
                    stored = %state.report_id,
                    "state report id mismatch, starting fresh"
                );
                State::new(report_id)
            }
            Err(e) => {
                warn!(report = report_id, error = %e, "failed to parse state, starting fresh");
                State::new(report_id)
            }
        }
    }

    fn save(&self, state: &mut State) -> Result<()> {
        state.last_run_at = Utc::now();
        let raw = serde_json::to_string(state)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("state store lock poisoned"))?;
        records.insert(state.report_id.clone(), raw);
        Ok(())
    }
}
