// src/guard/mod.rs

//! Duplicate-run guard.
//!
//! [`RunGuard::check_and_reserve`] refuses a launch while the pid recorded
//! for a task key is still alive. The record is written by
//! [`RunGuard::record`] only *after* a successful spawn, and nothing locks
//! the gap between the two calls: concurrent launches of the same key can
//! both pass the check.

pub mod probe;
pub mod record;
pub mod store;

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{JobwatchError, Result};
use crate::types::RecordStorageMode;

pub use probe::{OsProcessProbe, ProcessProbe};
pub use record::RunRecord;
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore};

#[derive(Debug, Clone)]
pub struct RunGuard {
    store: Arc<dyn RecordStore>,
    probe: Arc<dyn ProcessProbe>,
}

impl RunGuard {
    pub fn new(store: Arc<dyn RecordStore>, probe: Arc<dyn ProcessProbe>) -> Self {
        Self { store, probe }
    }

    /// Guard backed by the configured record storage and the OS probe.
    pub fn with_storage(mode: RecordStorageMode, state_dir: impl Into<std::path::PathBuf>) -> Self {
        let store: Arc<dyn RecordStore> = match mode {
            RecordStorageMode::File => Arc::new(FileRecordStore::new(state_dir)),
            RecordStorageMode::Memory => Arc::new(MemoryRecordStore::new()),
        };
        Self::new(store, Arc::new(OsProcessProbe))
    }

    /// `Ok(())` when no live run is recorded for `key`.
    pub fn check_and_reserve(&self, key: &str) -> Result<()> {
        let Some(existing) = self.store.load(key)? else {
            debug!(task = %key, "no previous run recorded");
            return Ok(());
        };

        if self.probe.is_alive(existing.pid) {
            info!(task = %key, pid = existing.pid, "refusing launch; previous run still alive");
            return Err(JobwatchError::AlreadyRunning {
                key: key.to_string(),
                pid: existing.pid,
            });
        }

        debug!(task = %key, pid = existing.pid, "previous run has exited");
        Ok(())
    }

    /// Associate a freshly spawned pid and log with its task key.
    pub fn record(&self, record: &RunRecord) -> Result<()> {
        self.store.save(record)?;
        Ok(())
    }

    pub fn last_record(&self, key: &str) -> Result<Option<RunRecord>> {
        Ok(self.store.load(key)?)
    }

    /// Whether the recorded run for `key` is still alive.
    pub fn is_running(&self, key: &str) -> Result<bool> {
        Ok(self.last_record(key)?.is_some_and(|r| self.is_alive(&r)))
    }

    /// Probe the pid of an already loaded record.
    pub fn is_alive(&self, record: &RunRecord) -> bool {
        self.probe.is_alive(record.pid)
    }
}
