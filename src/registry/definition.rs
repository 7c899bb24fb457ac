// src/registry/definition.rs

use std::path::{Path, PathBuf};

use crate::config::TaskConfig;

/// Log stem used when no program name can be derived.
pub const FALLBACK_STEM: &str = "task";

/// A fully resolved task: what to run, where, and how to name its logs.
///
/// Built once by the registry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub key: String,
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    /// Human-readable name given in the config, if any.
    pub label: Option<String>,
    /// Primary executable whose presence gates a launch. `None` for bare
    /// programs looked up on `PATH`.
    pub script: Option<PathBuf>,
    /// Prefix of every log file produced by this task.
    pub stem: String,
}

impl TaskDefinition {
    pub fn from_config(key: &str, task: &TaskConfig, root: &Path, extensions: &[String]) -> Self {
        let argv: Vec<String> = task
            .cmd
            .iter()
            .map(|arg| anchor_script_arg(arg, root, extensions))
            .collect();

        let cwd = match task.cwd {
            Some(ref dir) => root.join(dir),
            None => root.to_path_buf(),
        };

        let script = match task.script {
            Some(ref path) => Some(root.join(path)),
            None => detect_script(&argv, extensions),
        };

        let stem = script
            .as_deref()
            .and_then(file_stem)
            .or_else(|| argv.first().and_then(|p| file_stem(Path::new(p))))
            .unwrap_or_else(|| FALLBACK_STEM.to_string());

        Self {
            key: key.to_string(),
            argv,
            cwd,
            label: task.label.clone(),
            script,
            stem,
        }
    }

    /// The configured label, else the key.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    /// Program and its arguments; `None` for an empty argv.
    pub fn split_program(&self) -> Option<(&String, &[String])> {
        self.argv.split_first()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_script_like(arg: &str, extensions: &[String]) -> bool {
    let path = Path::new(arg);
    extensions.iter().any(|ext| has_extension(path, ext))
}

/// Relative script arguments are taken to live under the registry root.
fn anchor_script_arg(arg: &str, root: &Path, extensions: &[String]) -> String {
    let path = Path::new(arg);
    if path.is_relative() && is_script_like(arg, extensions) {
        root.join(path).to_string_lossy().into_owned()
    } else {
        arg.to_string()
    }
}

/// Pick the primary executable out of an argv.
///
/// Extensions are tried in priority order, so with the defaults a `.py`
/// payload wins over the `.sh` wrapper that launches it. Without any
/// script-like argument, `argv[0]` counts only when it is a path.
pub fn detect_script(argv: &[String], extensions: &[String]) -> Option<PathBuf> {
    for ext in extensions {
        if let Some(arg) = argv.iter().find(|a| has_extension(Path::new(a), ext)) {
            return Some(PathBuf::from(arg));
        }
    }

    argv.first()
        .filter(|program| program.contains('/') || program.contains('\\'))
        .map(PathBuf::from)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
