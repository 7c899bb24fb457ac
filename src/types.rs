use std::fmt;

use serde::{Deserialize, Serialize};

/// Inferred state of a run, derived from its log text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Success,
    Error,
}

impl TaskStatus {
    /// `success` and `error` are terminal; `running` may still change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a log is rendered by the read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Summary,
    Raw,
}

/// Where run records (pid markers) are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStorageMode {
    /// One JSON file per task key under the state directory.
    File,
    /// In-process map only (lost on restart).
    Memory,
}

impl Default for RecordStorageMode {
    fn default() -> Self {
        RecordStorageMode::File
    }
}
