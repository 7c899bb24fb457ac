// src/config/validate.rs

use regex::RegexBuilder;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{JobwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = JobwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_tasks(cfg)?;
    validate_markers(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(JobwatchError::ConfigError(
            "config must contain at least one [task.<key>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.list_limit == 0 {
        return Err(JobwatchError::ConfigError(
            "[config].list_limit must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.raw_limit_bytes == 0 {
        return Err(JobwatchError::ConfigError(
            "[config].raw_limit_bytes must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.scan_limit_bytes == 0 {
        return Err(JobwatchError::ConfigError(
            "[config].scan_limit_bytes must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.log_dir.as_os_str().is_empty() {
        return Err(JobwatchError::ConfigError(
            "[config].log_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Task keys end up in record file names, so they are kept to a safe charset.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (key, task) in cfg.task.iter() {
        if !is_valid_key(key) {
            return Err(JobwatchError::ConfigError(format!(
                "task key '{}' may only contain ASCII letters, digits, '_' and '-'",
                key
            )));
        }
        match task.cmd.first() {
            None => {
                return Err(JobwatchError::ConfigError(format!(
                    "task '{}' has an empty `cmd`",
                    key
                )));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(JobwatchError::ConfigError(format!(
                    "task '{}' has a blank program in `cmd`",
                    key
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_markers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.status.error_markers.iter().any(|m| m.is_empty()) {
        return Err(JobwatchError::ConfigError(
            "[status].error_markers must not contain empty strings".to_string(),
        ));
    }
    if cfg.status.success_keywords.iter().any(|k| k.is_empty()) {
        return Err(JobwatchError::ConfigError(
            "[status].success_keywords must not contain empty strings".to_string(),
        ));
    }
    for pattern in cfg.summary.patterns.iter() {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                JobwatchError::ConfigError(format!(
                    "[summary].patterns entry '{}' is not a valid regex: {}",
                    pattern, e
                ))
            })?;
    }
    Ok(())
}
