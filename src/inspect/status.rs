// src/inspect/status.rs

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::errors::{JobwatchError, Result};
use crate::fs::FileSystem;
use crate::inspect::for_each_line;
use crate::inspect::rules::StatusRules;
use crate::types::TaskStatus;

/// Bytes at the end of an oversized log that are always scanned.
pub const TAIL_BYTES: u64 = 64 * 1024;

/// Classifies a log from its text alone.
///
/// Stateless: every call re-reads the file. There is no notion of exit
/// code, so a child that exits without printing a recognised marker stays
/// `running` forever.
#[derive(Debug, Clone)]
pub struct StatusInferencer {
    rules: StatusRules,
    scan_limit: u64,
    fs: Arc<dyn FileSystem>,
}

impl StatusInferencer {
    pub fn new(rules: StatusRules, scan_limit: u64, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            rules,
            scan_limit,
            fs,
        }
    }

    pub fn classify(&self, path: &Path) -> Result<TaskStatus> {
        let read_failure = |detail: String| JobwatchError::ReadFailure {
            name: path.display().to_string(),
            detail,
        };

        let size = self
            .fs
            .metadata(path)
            .map_err(|e| read_failure(format!("{e:#}")))?
            .size;
        let mut reader = self
            .fs
            .open_read(path)
            .map_err(|e| read_failure(format!("{e:#}")))?;

        let mut eval = self.rules.evaluator();

        for_each_line((&mut reader).take(self.scan_limit), |line| eval.feed(line))
            .map_err(|e| read_failure(e.to_string()))?;

        if size > self.scan_limit {
            // Oversized: jump to the tail so trailing tracebacks and the real
            // last line are still seen. A line cut by the seek is dropped.
            let tail_start = size.saturating_sub(TAIL_BYTES).max(self.scan_limit);
            reader
                .seek(SeekFrom::Start(tail_start))
                .map_err(|e| read_failure(e.to_string()))?;
            eval.reset_last_line();

            let mut first = tail_start > self.scan_limit;
            for_each_line(reader, |line| {
                if std::mem::take(&mut first) {
                    return;
                }
                eval.feed(line);
            })
            .map_err(|e| read_failure(e.to_string()))?;
        }

        Ok(eval.finish())
    }
}
