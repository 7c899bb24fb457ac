// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::ReadMode;

/// Command-line arguments for `jobwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobwatch",
    version,
    about = "Launch long-running jobs detached and follow them through their logs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Jobwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Jobwatch.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show registered tasks, script presence and the last recorded run.
    Tasks,

    /// Start a task detached and print the name of its log.
    Launch {
        /// Task key from `[task.<key>]`.
        key: String,
    },

    /// Print the inferred status of a log (running, success, error).
    Status {
        /// Log file name, e.g. `API_interface_ME_ver00.1755872945.log`.
        name: String,

        /// Keep polling until the status is no longer `running`.
        #[arg(long)]
        wait: bool,

        /// Seconds between polls with `--wait`.
        #[arg(long, value_name = "SECS", default_value_t = 2)]
        interval: u64,

        /// Give up waiting after this many seconds (0 = never).
        #[arg(long, value_name = "SECS", default_value_t = 0)]
        timeout: u64,
    },

    /// List logs, newest first.
    List {
        /// Maximum number of rows (bounded by `[config].list_limit`).
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Print a log as a summary (default) or raw text.
    Read {
        name: String,

        #[arg(long, value_enum, default_value = "summary")]
        mode: ReadModeArg,
    },

    /// Copy a log's raw bytes to a file, or to stdout.
    Download {
        name: String,

        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Read mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ReadModeArg {
    Summary,
    Raw,
}

impl From<ReadModeArg> for ReadMode {
    fn from(arg: ReadModeArg) -> Self {
        match arg {
            ReadModeArg::Summary => ReadMode::Summary,
            ReadModeArg::Raw => ReadMode::Raw,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
