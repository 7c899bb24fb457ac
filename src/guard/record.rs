// src/guard/record.rs

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known run of a task key. Overwritten by every successful launch and
/// never deleted, so it may describe a process that is long gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub task_key: String,
    pub pid: u32,
    pub log_path: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(task_key: impl Into<String>, pid: u32, log_path: impl Into<PathBuf>) -> Self {
        Self {
            task_key: task_key.into(),
            pid,
            log_path: log_path.into(),
            started_at: Utc::now(),
        }
    }

    /// File name of the log this run writes to.
    pub fn log_name(&self) -> Option<&str> {
        self.log_path.file_name().and_then(|n| n.to_str())
    }
}
