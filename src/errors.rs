// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The launch-path variants (`NotFound`, `ScriptMissing`, `AlreadyRunning`,
//! `SpawnFailure`) are surfaced to callers verbatim and never retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Script for task '{key}' not found: {}", path.display())]
    ScriptMissing { key: String, path: PathBuf },

    #[error("Task '{key}' is already running (pid {pid})")]
    AlreadyRunning { key: String, pid: u32 },

    #[error("Failed to start task '{key}': {source}")]
    SpawnFailure {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log {name}: {detail}")]
    ReadFailure { name: String, detail: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobwatchError {
    /// True for the "nothing there" family: unknown key, unresolved log name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobwatchError::NotFound(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JobwatchError>;
