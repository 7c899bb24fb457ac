// src/exec/launcher.rs

//! Spawning detached task processes.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::process::Command;
use tracing::{info, warn};

use crate::errors::{JobwatchError, Result};
use crate::exec::backend::{LaunchBackend, LaunchFuture, Launched};
use crate::exec::detach::DetachStrategy;
use crate::logs::LogName;
use crate::registry::TaskDefinition;

/// Environment forced on every child so its output is UTF-8.
const UTF8_ENV: &[(&str, &str)] = &[("PYTHONIOENCODING", "utf-8"), ("PYTHONUTF8", "1")];

/// Starts task processes with stdout+stderr going to a fresh log file.
///
/// The launcher never waits on a child: `launch` returns as soon as the OS
/// has created the process, and the `Child` handle is dropped.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    log_dir: PathBuf,
    detach: DetachStrategy,
}

impl ProcessLauncher {
    pub fn new(log_dir: impl Into<PathBuf>, detach: DetachStrategy) -> Self {
        Self {
            log_dir: log_dir.into(),
            detach,
        }
    }

    pub async fn spawn_detached(&self, def: &TaskDefinition) -> Result<Launched> {
        let spawn_failure = |source: io::Error| JobwatchError::SpawnFailure {
            key: def.key.clone(),
            source,
        };

        let Some((program, args)) = def.split_program() else {
            return Err(spawn_failure(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty command",
            )));
        };

        let name = LogName::new(&def.stem, epoch_seconds());
        let log_name = name.file_name();
        let log_path = self.log_dir.join(&log_name);

        tokio::fs::create_dir_all(&self.log_dir)
            .await
            .map_err(spawn_failure)?;

        // `create_new`: a name is never reused, so an existing file means
        // another launch of the same stem in the same second. Leave it alone.
        let stdout = tokio::fs::OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&log_path)
            .await
            .map_err(spawn_failure)?
            .into_std()
            .await;

        let stderr = match stdout.try_clone() {
            Ok(file) => file,
            Err(e) => {
                remove_log(&log_path).await;
                return Err(spawn_failure(e));
            }
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&def.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        for (key, value) in UTF8_ENV {
            cmd.env(key, value);
        }
        if std::env::var_os("LANG").is_none() && std::env::var_os("LC_ALL").is_none() {
            cmd.env("LANG", "C.UTF-8");
        }
        self.detach.apply(&mut cmd);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    task = %def.key,
                    program = %program,
                    error = %e,
                    "failed to spawn task process"
                );
                remove_log(&log_path).await;
                return Err(spawn_failure(e));
            }
        };

        // A child that was never polled always has an id.
        let pid = child.id().ok_or_else(|| {
            spawn_failure(io::Error::other("child exited before its pid was read"))
        })?;
        drop(child);

        info!(
            task = %def.key,
            pid,
            log = %log_name,
            cwd = ?def.cwd,
            "started detached task process"
        );

        Ok(Launched {
            pid,
            log_path,
            log_name,
        })
    }
}

impl LaunchBackend for ProcessLauncher {
    fn launch<'a>(&'a self, def: &'a TaskDefinition) -> LaunchFuture<'a> {
        Box::pin(self.spawn_detached(def))
    }
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn remove_log(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(log = ?path, error = %e, "failed to remove log of failed launch");
    }
}
