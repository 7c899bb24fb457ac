// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::RecordStorageMode;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// log_dir = "logs"
/// list_limit = 200
///
/// [registry]
/// root = "/home/developer/API"
///
/// [task.qr_api_me]
/// cmd = ["/bin/bash", "run_interpreter.sh", "API_interface_ME_ver00.py"]
/// label = "AI Interpreter – Mechanical"
/// ```
///
/// Everything except `[task.<key>]` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub status: StatusSection,

    #[serde(default)]
    pub summary: SummarySection,

    #[serde(default)]
    pub title: TitleSection,

    /// All tasks from `[task.<key>]`, keyed by task key.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub registry: RegistrySection,
    pub status: StatusSection,
    pub summary: SummarySection,
    pub title: TitleSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            registry: raw.registry,
            status: raw.status,
            summary: raw.summary,
            title: raw.title,
            task: raw.task,
        }
    }
}

/// `[config]` section: directories and size bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Directory holding `<stem>.<unix-seconds>.log` files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Directory holding run records when `record_storage = "file"`.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default)]
    pub record_storage: RecordStorageMode,

    /// Maximum number of rows returned by a listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Files above this size are not rendered inline in raw mode.
    #[serde(default = "default_raw_limit_bytes")]
    pub raw_limit_bytes: u64,

    /// Prefix of a log scanned by status inference; the tail is always
    /// scanned as well.
    #[serde(default = "default_scan_limit_bytes")]
    pub scan_limit_bytes: u64,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".jobwatch")
}

fn default_list_limit() -> usize {
    200
}

fn default_raw_limit_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_scan_limit_bytes() -> u64 {
    8 * 1024 * 1024
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            state_dir: default_state_dir(),
            record_storage: RecordStorageMode::default(),
            list_limit: default_list_limit(),
            raw_limit_bytes: default_raw_limit_bytes(),
            scan_limit_bytes: default_scan_limit_bytes(),
        }
    }
}

/// `[registry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySection {
    /// Folder the task scripts live in. Relative `cwd` and script paths are
    /// joined to it. Overridden by `JOBWATCH_ROOT`.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Extensions that mark an argv entry as the task's primary script, in
    /// priority order.
    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_script_extensions() -> Vec<String> {
    vec!["py".to_string(), "sh".to_string()]
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            root: default_root(),
            script_extensions: default_script_extensions(),
        }
    }
}

/// `[status]` section: markers driving status inference.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSection {
    /// Case-sensitive substrings that mark a run as failed.
    #[serde(default = "default_error_markers")]
    pub error_markers: Vec<String>,

    /// Case-insensitive substrings that mark a run as completed.
    #[serde(default = "default_success_keywords")]
    pub success_keywords: Vec<String>,
}

pub fn default_error_markers() -> Vec<String> {
    ["Traceback (most recent call last):", "Error:", "ModuleNotFoundError"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_success_keywords() -> Vec<String> {
    [
        "Saved",
        "Total assets found",
        "Finished",
        "Completed",
        "Done",
        "SUMMARY",
        "Successfully updated database",
        "Success! Updated",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            error_markers: default_error_markers(),
            success_keywords: default_success_keywords(),
        }
    }
}

/// `[summary]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarySection {
    /// Regexes (case-insensitive) matched against each trimmed line.
    #[serde(default = "default_summary_patterns")]
    pub patterns: Vec<String>,

    /// Returned when no line matches.
    #[serde(default = "default_empty_summary")]
    pub empty_placeholder: String,
}

pub fn default_summary_patterns() -> Vec<String> {
    [
        r"^Total assets found.*:\s*\d+\s*$",
        r"^Processing\s+QR\s+\d+",
        r"(^|\s)Saved\s",
        r"Successfully saved",
        r"^--- SUMMARY ---",
        r"Success! Updated",
        r"Successfully updated database",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_empty_summary() -> String {
    "No summary items found.".to_string()
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            patterns: default_summary_patterns(),
            empty_placeholder: default_empty_summary(),
        }
    }
}

/// `[title]` section: how listing rows get a human-readable title when the
/// stem does not belong to exactly one registered task.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleSection {
    #[serde(default = "default_title_rules")]
    pub rules: Vec<TitleRuleConfig>,

    /// Tokens appended as ` – <TOKEN>` when found in the stem.
    #[serde(default = "default_title_categories")]
    pub categories: Vec<String>,

    /// Title for stems no rule matches. `None` falls back to the stem itself.
    #[serde(default)]
    pub fallback: Option<String>,
}

/// One `[[title.rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRuleConfig {
    /// Substring of the stem.
    pub contains: String,
    pub title: String,
    /// Whether a category suffix may be appended.
    #[serde(default = "default_true")]
    pub categorize: bool,
}

fn default_true() -> bool {
    true
}

fn default_title_rules() -> Vec<TitleRuleConfig> {
    vec![
        TitleRuleConfig {
            contains: "updating_process_database".to_string(),
            title: "Data Processing Task".to_string(),
            categorize: false,
        },
        TitleRuleConfig {
            contains: "Interpreter".to_string(),
            title: "API Interpreter".to_string(),
            categorize: true,
        },
        TitleRuleConfig {
            contains: "API_interface".to_string(),
            title: "API Interpreter".to_string(),
            categorize: true,
        },
    ]
}

fn default_title_categories() -> Vec<String> {
    vec!["ME".to_string(), "BF".to_string(), "EL".to_string()]
}

impl Default for TitleSection {
    fn default() -> Self {
        Self {
            rules: default_title_rules(),
            categories: default_title_categories(),
            fallback: None,
        }
    }
}

/// `[task.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Full argv; `cmd[0]` is the program.
    pub cmd: Vec<String>,

    /// Working directory; relative paths are joined to the registry root.
    /// Defaults to the root itself.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Display label; defaults to the task key.
    #[serde(default)]
    pub label: Option<String>,

    /// Explicit primary script. When unset it is detected from `cmd`.
    #[serde(default)]
    pub script: Option<PathBuf>,
}
