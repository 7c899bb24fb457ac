// src/engine/service.rs

//! The engine facade: one object, built once at startup, that implements
//! every external contract (launch, status, list, read, download).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ConfigFile;
use crate::errors::{JobwatchError, Result};
use crate::exec::{DetachStrategy, LaunchBackend, Launched, ProcessLauncher};
use crate::fs::{FileSystem, ReadSeek, RealFileSystem};
use crate::guard::{RunGuard, RunRecord};
use crate::inspect::{LogSummarizer, StatusInferencer, StatusRules};
use crate::logs::{LogEntry, LogStore, TitleResolver};
use crate::registry::{TaskDefinition, TaskRegistry};
use crate::types::{ReadMode, TaskStatus};

/// Directories an engine works in, already anchored at the config location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePaths {
    pub root: PathBuf,
    pub log_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl EnginePaths {
    /// Anchor the relative directories of `cfg` at `base_dir`.
    ///
    /// The results are absolute: children run with `cwd` set below the root,
    /// so a relative script path would be resolved twice.
    pub fn resolve(cfg: &ConfigFile, base_dir: &Path) -> Result<Self> {
        let base = std::path::absolute(base_dir)?;
        Ok(Self {
            root: base.join(&cfg.registry.root),
            log_dir: base.join(&cfg.config.log_dir),
            state_dir: base.join(&cfg.config.state_dir),
        })
    }
}

/// Registry entry plus what is currently known about its runs.
#[derive(Debug, Clone)]
pub struct TaskOverview {
    pub definition: TaskDefinition,
    pub script_exists: bool,
    pub last_run: Option<RunRecord>,
    pub alive: bool,
}

/// A log opened for download.
pub struct Download {
    pub name: String,
    pub path: PathBuf,
    pub reader: Box<dyn ReadSeek>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Engine {
    registry: TaskRegistry,
    guard: RunGuard,
    launcher: Arc<dyn LaunchBackend>,
    logs: LogStore,
    titles: TitleResolver,
    status: StatusInferencer,
    summarizer: LogSummarizer,
    list_limit: usize,
}

impl Engine {
    /// Production wiring: real filesystem, OS probe, detached launcher.
    pub fn from_config(cfg: &ConfigFile, base_dir: &Path) -> Result<Self> {
        let paths = EnginePaths::resolve(cfg, base_dir)?;
        let guard = RunGuard::with_storage(cfg.config.record_storage, &paths.state_dir);
        let launcher = Arc::new(ProcessLauncher::new(
            &paths.log_dir,
            DetachStrategy::for_current_os(),
        ));
        Self::with_parts(cfg, paths, Arc::new(RealFileSystem), guard, launcher)
    }

    /// Wire an engine from explicit collaborators.
    pub fn with_parts(
        cfg: &ConfigFile,
        paths: EnginePaths,
        fs: Arc<dyn FileSystem>,
        guard: RunGuard,
        launcher: Arc<dyn LaunchBackend>,
    ) -> Result<Self> {
        let registry = TaskRegistry::from_config(cfg, &paths.root);
        let titles = TitleResolver::new(&cfg.title, &registry);
        let status = StatusInferencer::new(
            StatusRules::from_config(&cfg.status),
            cfg.config.scan_limit_bytes,
            Arc::clone(&fs),
        );
        let summarizer =
            LogSummarizer::from_config(&cfg.summary, cfg.config.raw_limit_bytes, Arc::clone(&fs))?;
        let logs = LogStore::new(&paths.log_dir, fs);

        Ok(Self {
            registry,
            guard,
            launcher,
            logs,
            titles,
            status,
            summarizer,
            list_limit: cfg.config.list_limit,
        })
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn logs(&self) -> &LogStore {
        &self.logs
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Start the task behind `key` unless its previous run is still alive.
    ///
    /// Check and record are two separate steps; see [`crate::guard`].
    pub async fn launch(&self, key: &str) -> Result<Launched> {
        let def = self.registry.resolve(key)?;
        self.guard.check_and_reserve(key)?;

        let launched = self.launcher.launch(def).await?;

        let record = RunRecord::new(key, launched.pid, &launched.log_path);
        if let Err(e) = self.guard.record(&record) {
            // The child is already running; the launch itself succeeded.
            error!(task = %key, pid = launched.pid, error = %e, "failed to persist run record");
        }

        info!(task = %key, pid = launched.pid, log = %launched.log_name, "task launched");
        Ok(launched)
    }

    /// Inferred status of one log. Unreadable logs report `error`.
    pub fn status(&self, name: &str) -> Result<TaskStatus> {
        let path = self.logs.resolve(name)?;
        match self.status.classify(&path) {
            Ok(status) => Ok(status),
            Err(JobwatchError::ReadFailure { detail, .. }) => {
                warn!(log = %name, detail = %detail, "log unreadable; reporting error status");
                Ok(TaskStatus::Error)
            }
            Err(e) => Err(e),
        }
    }

    /// Newest logs first, capped at the configured limit.
    pub fn list(&self) -> Vec<LogEntry> {
        self.list_with_limit(self.list_limit)
    }

    /// Like [`Engine::list`] with a caller-chosen cap, itself bounded by the
    /// configured limit.
    pub fn list_with_limit(&self, limit: usize) -> Vec<LogEntry> {
        match self.logs.list(limit.min(self.list_limit), &self.titles) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(dir = ?self.logs.dir(), error = %e, "failed to list logs");
                Vec::new()
            }
        }
    }

    /// Summary or raw rendering of a log.
    pub fn read(&self, name: &str, mode: ReadMode) -> Result<String> {
        let path = self.logs.resolve(name)?;
        let rendered = match mode {
            ReadMode::Summary => self.summarizer.summarize(&path),
            ReadMode::Raw => self.summarizer.raw(&path).map(|view| view.into_text(name)),
        };

        match rendered {
            Ok(text) => Ok(text),
            Err(JobwatchError::ReadFailure { detail, .. }) => {
                warn!(log = %name, detail = %detail, "log unreadable; returning placeholder");
                Ok(format!("Log {name} could not be read: {detail}"))
            }
            Err(e) => Err(e),
        }
    }

    /// Open a log as a byte stream.
    pub fn download(&self, name: &str) -> Result<Download> {
        let (path, reader) = self.logs.open(name)?;
        Ok(Download {
            name: name.to_string(),
            path,
            reader,
        })
    }

    /// Every registered task with script presence and last run state.
    pub fn tasks(&self) -> Result<Vec<TaskOverview>> {
        self.registry
            .iter()
            .map(|def| {
                let last_run = self.guard.last_record(&def.key)?;
                let alive = last_run.as_ref().is_some_and(|r| self.guard.is_alive(r));
                Ok(TaskOverview {
                    script_exists: def.script.as_ref().is_none_or(|s| s.exists()),
                    definition: def.clone(),
                    last_run,
                    alive,
                })
            })
            .collect()
    }
}
