// src/logs/naming.rs

//! The `<stem>.<unix-seconds>.log` naming contract.

use std::fmt;

use chrono::{Local, TimeZone};

pub const LOG_EXTENSION: &str = "log";

/// Rendered in place of a timestamp that cannot be derived.
pub const UNKNOWN_WHEN: &str = "—";

/// A parsed log file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogName {
    pub stem: String,
    pub timestamp: u64,
}

impl LogName {
    pub fn new(stem: impl Into<String>, timestamp: u64) -> Self {
        Self {
            stem: stem.into(),
            timestamp,
        }
    }

    /// Parse `<stem>.<digits>.log`. The stem may itself contain dots.
    pub fn parse(name: &str) -> Option<Self> {
        let base = name.strip_suffix(".log")?;
        let (stem, ts) = base.rsplit_once('.')?;
        if stem.is_empty() || ts.is_empty() || !ts.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp = ts.parse().ok()?;
        Some(Self::new(stem, timestamp))
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}.{}", self.stem, self.timestamp, LOG_EXTENSION)
    }
}

impl fmt::Display for LogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Stem of a log name even when the timestamp part is missing or malformed.
pub fn stem_of(name: &str) -> &str {
    let base = name.strip_suffix(".log").unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ts)) if !stem.is_empty() && ts.bytes().all(|b| b.is_ascii_digit()) => stem,
        _ => base,
    }
}

/// Local `YYYY-MM-DD HH:MM:SS` rendering of an epoch timestamp.
pub fn format_when(timestamp: Option<u64>) -> String {
    timestamp
        .and_then(|ts| i64::try_from(ts).ok())
        .and_then(|ts| Local.timestamp_opt(ts, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_WHEN.to_string())
}
