// src/logs/store.rs

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use tracing::{debug, warn};

use crate::errors::{JobwatchError, Result};
use crate::fs::{FileSystem, ReadSeek};
use crate::logs::naming::{format_when, stem_of, LogName, LOG_EXTENSION};
use crate::logs::title::TitleResolver;

/// One row of a log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub name: String,
    pub stem: String,
    /// Epoch seconds embedded in the name, if it parses.
    pub timestamp: Option<u64>,
    /// Human-readable local time, or `—`.
    pub when: String,
    pub title: String,
    pub size_bytes: u64,
}

impl LogEntry {
    /// `max(size / 1024, 1) KB`.
    pub fn size_kb(&self) -> String {
        format!("{} KB", (self.size_bytes / 1024).max(1))
    }
}

/// Names, enumerates and safely resolves log files inside one directory.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Newest-first listing, never longer than `limit`.
    ///
    /// Ordering uses the timestamp embedded in the name; names without one
    /// fall back to the file's modification time. Entries whose metadata
    /// cannot be read are skipped rather than failing the listing.
    pub fn list(&self, limit: usize, titles: &TitleResolver) -> Result<Vec<LogEntry>> {
        if !self.fs.is_dir(&self.dir) {
            debug!(dir = ?self.dir, "log directory does not exist yet");
            return Ok(Vec::new());
        }

        let mut rows: Vec<(u64, LogEntry)> = Vec::new();
        for path in self.fs.read_dir(&self.dir)? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !has_log_extension(name) {
                continue;
            }

            let meta = match self.fs.metadata(&path) {
                Ok(meta) if meta.is_file => meta,
                Ok(_) => continue,
                Err(e) => {
                    warn!(log = %name, error = %e, "skipping unreadable log entry");
                    continue;
                }
            };

            let parsed = LogName::parse(name);
            let timestamp = parsed.as_ref().map(|n| n.timestamp);
            let sort_key = timestamp.unwrap_or_else(|| {
                meta.modified
                    .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0)
            });
            let stem = stem_of(name).to_string();

            rows.push((
                sort_key,
                LogEntry {
                    name: name.to_string(),
                    title: titles.title_for(&stem),
                    stem,
                    timestamp,
                    when: format_when(timestamp),
                    size_bytes: meta.size,
                },
            ));
        }

        rows.sort_by(|(ka, a), (kb, b)| kb.cmp(ka).then_with(|| b.name.cmp(&a.name)));
        rows.truncate(limit);

        Ok(rows.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Map a logical log name to a path that is guaranteed to be an existing
    /// regular file directly inside the log directory.
    ///
    /// Every rejection is reported as `NotFound`, so callers cannot probe for
    /// files outside the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let not_found = || JobwatchError::NotFound(format!("log not found: {name}"));

        if !is_plain_file_name(name) {
            debug!(log = %name, "rejected log name");
            return Err(not_found());
        }

        let dir = self.fs.canonicalize(&self.dir).map_err(|_| not_found())?;
        let path = self
            .fs
            .canonicalize(&self.dir.join(name))
            .map_err(|_| not_found())?;

        if path.parent() != Some(dir.as_path()) {
            warn!(log = %name, resolved = ?path, "log name resolved outside the log directory");
            return Err(not_found());
        }

        match self.fs.metadata(&path) {
            Ok(meta) if meta.is_file => Ok(path),
            _ => Err(not_found()),
        }
    }

    /// Open a log for streaming (downloads, inspection).
    pub fn open(&self, name: &str) -> Result<(PathBuf, Box<dyn ReadSeek>)> {
        let path = self.resolve(name)?;
        let reader = self.fs.open_read(&path).map_err(|e| JobwatchError::ReadFailure {
            name: name.to_string(),
            detail: format!("{e:#}"),
        })?;
        Ok((path, reader))
    }
}

fn has_log_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == LOG_EXTENSION)
}

/// A single, normal path component without separators or traversal.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty()
        || name.contains("..")
        || name.contains(['/', '\\', ':', '\0'])
        || Path::new(name).is_absolute()
    {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
