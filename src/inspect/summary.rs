// src/inspect/summary.rs

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::config::SummarySection;
use crate::errors::{JobwatchError, Result};
use crate::fs::FileSystem;
use crate::inspect::for_each_line;

/// Result of a raw read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawView {
    Text(String),
    TooLarge { size: u64, limit: u64 },
}

impl RawView {
    /// Text to show inline; oversized logs get a pointer to the download.
    pub fn into_text(self, name: &str) -> String {
        match self {
            RawView::Text(text) => text,
            RawView::TooLarge { size, limit } => format!(
                "Log {name} is too large to display inline ({size} bytes, limit {limit} bytes). \
                 Use the download to get the full file."
            ),
        }
    }
}

/// Condenses logs to the lines worth a glance.
#[derive(Debug, Clone)]
pub struct LogSummarizer {
    patterns: Vec<Regex>,
    placeholder: String,
    raw_limit: u64,
    fs: Arc<dyn FileSystem>,
}

impl LogSummarizer {
    pub fn new(
        patterns: Vec<Regex>,
        placeholder: impl Into<String>,
        raw_limit: u64,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            patterns,
            placeholder: placeholder.into(),
            raw_limit,
            fs,
        }
    }

    /// Compile the `[summary]` patterns case-insensitively.
    pub fn from_config(
        section: &SummarySection,
        raw_limit: u64,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let patterns = section
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        JobwatchError::ConfigError(format!("invalid summary pattern '{p}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(patterns, section.empty_placeholder.clone(), raw_limit, fs))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_salient(&self, line: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(line))
    }

    /// Matching lines, trimmed, one per line; the placeholder if none match.
    pub fn summarize(&self, path: &Path) -> Result<String> {
        let reader = self.open(path)?;

        let mut keep: Vec<String> = Vec::new();
        for_each_line(reader, |raw| {
            let line = raw.trim();
            if self.is_salient(line) {
                keep.push(line.to_string());
            }
        })
        .map_err(|e| read_failure(path, e.to_string()))?;

        if keep.is_empty() {
            Ok(self.placeholder.clone())
        } else {
            Ok(keep.join("\n"))
        }
    }

    /// Whole content, unless the file is above the inline ceiling.
    pub fn raw(&self, path: &Path) -> Result<RawView> {
        let size = self
            .fs
            .metadata(path)
            .map_err(|e| read_failure(path, format!("{e:#}")))?
            .size;
        if size > self.raw_limit {
            return Ok(RawView::TooLarge {
                size,
                limit: self.raw_limit,
            });
        }

        let mut bytes = Vec::with_capacity(size as usize);
        self.open(path)?
            .take(self.raw_limit)
            .read_to_end(&mut bytes)
            .map_err(|e| read_failure(path, e.to_string()))?;
        Ok(RawView::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn crate::fs::ReadSeek>> {
        self.fs
            .open_read(path)
            .map_err(|e| read_failure(path, format!("{e:#}")))
    }
}

fn read_failure(path: &Path, detail: String) -> JobwatchError {
    JobwatchError::ReadFailure {
        name: path.display().to_string(),
        detail,
    }
}
