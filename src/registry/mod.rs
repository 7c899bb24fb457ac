// src/registry/mod.rs

//! Task registry: maps stable task keys to resolved command definitions.
//!
//! The registry is built once from the validated config. Script presence is
//! *not* cached: every [`TaskRegistry::resolve`] call re-checks the disk, so a
//! script moved after startup is reported as missing on the next launch.

pub mod definition;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{JobwatchError, Result};

pub use definition::{detect_script, TaskDefinition, FALLBACK_STEM};

#[derive(Debug, Clone)]
pub struct TaskRegistry {
    root: PathBuf,
    tasks: BTreeMap<String, TaskDefinition>,
}

impl TaskRegistry {
    /// Build the registry, anchoring relative paths at `root`.
    pub fn from_config(cfg: &ConfigFile, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let extensions = &cfg.registry.script_extensions;

        let tasks = cfg
            .task
            .iter()
            .map(|(key, task)| {
                let def = TaskDefinition::from_config(key, task, &root, extensions);
                debug!(task = %key, stem = %def.stem, script = ?def.script, "registered task");
                (key.clone(), def)
            })
            .collect();

        Self { root, tasks }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a task and check its primary script still exists.
    pub fn resolve(&self, key: &str) -> Result<&TaskDefinition> {
        let def = self
            .tasks
            .get(key)
            .ok_or_else(|| JobwatchError::NotFound(format!("unknown task: {key}")))?;

        if let Some(ref script) = def.script {
            if !script.exists() {
                return Err(JobwatchError::ScriptMissing {
                    key: key.to_string(),
                    path: script.clone(),
                });
            }
        }

        Ok(def)
    }

    /// Look up a task without touching the filesystem.
    pub fn get(&self, key: &str) -> Option<&TaskDefinition> {
        self.tasks.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.tasks.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Configured label of the single task producing logs with this stem.
    ///
    /// Returns `None` when no task, or more than one, shares the stem, or
    /// when the owning task has no label.
    pub fn label_for_stem(&self, stem: &str) -> Option<&str> {
        let mut owners = self.tasks.values().filter(|d| d.stem == stem);
        match (owners.next(), owners.next()) {
            (Some(only), None) => only.label.as_deref(),
            _ => None,
        }
    }
}
