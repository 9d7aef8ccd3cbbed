//! Storage abstraction for processed-item state.
//!
//! The [`StateStore`] trait defines how a report's [`State`] is loaded at
//! the start of a run and persisted at the end, enabling pluggable
//! backends (JSON files on disk, in-memory for tests).
//!
//! # Contract
//!
//! | Method | Failure behavior |
//! |--------|------------------|
//! | [`load`](StateStore::load) | Never fails. Missing records yield an empty state; mismatched or corrupt records log a warning and yield an empty state. |
//! | [`save`](StateStore::save) | Refreshes `last_run_at`, then overwrites the record. Errors propagate. |
//!
//! Saves are last-writer-wins. At most one run per report id is assumed.

pub mod memory;

use anyhow::Result;

use crate::state::State;

/// Abstract storage backend for per-report [`State`] records.
pub trait StateStore: Send + Sync {
    /// Load the state for `report_id`, or a fresh empty state.
    fn load(&self, report_id: &str) -> State;

    /// Persist `state` under its own report id.
    ///
    /// Sets `state.last_run_at` to the current time before writing.
    fn save(&self, state: &mut State) -> Result<()>;
}
