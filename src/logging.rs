// src/logging.rs

//! `tracing` subscriber setup.
//!
//! Level selection, first match wins:
//! 1. `--log-level`
//! 2. `JOBWATCH_LOG`, as an `EnvFilter` directive string
//!    (`"debug"`, `"jobwatch::guard=trace,info"`, ...)
//! 3. `info`
//!
//! Output goes to stderr: stdout carries command results (log names,
//! statuses, log text) and must stay machine-readable.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "JOBWATCH_LOG";

/// Install the global subscriber. Call once, before the engine is built.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

/// Resolve the effective filter from the CLI flag and the env value.
///
/// An env value that fails to parse falls back to `info` rather than
/// aborting startup.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<String>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_directive(level));
    }

    env_value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
