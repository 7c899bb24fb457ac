#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use jobwatch::config::ConfigFile;
use jobwatch::engine::{Engine, EnginePaths};
use jobwatch::fs::RealFileSystem;
use jobwatch::guard::{MemoryRecordStore, RunGuard};

pub use jobwatch_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
pub use jobwatch_test_utils::fakes::{FakeLauncher, FakeProbe};
pub use jobwatch_test_utils::{init_tracing, with_timeout, write_script};

/// Scratch deployment: `root/` holds task scripts, `logs/` run logs and
/// `state/` run records.
pub struct Workspace {
    _dir: TempDir,
    pub root: PathBuf,
    pub logs: PathBuf,
    pub state: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let root = base.join("root");
        std::fs::create_dir_all(&root).unwrap();
        Self {
            _dir: dir,
            root,
            logs: base.join("logs"),
            state: base.join("state"),
        }
    }

    /// Config builder already pointed at this workspace.
    pub fn config(&self) -> ConfigFileBuilder {
        ConfigFileBuilder::new()
            .root(&self.root)
            .log_dir(&self.logs)
            .state_dir(&self.state)
    }

    pub fn paths(&self) -> EnginePaths {
        EnginePaths {
            root: self.root.clone(),
            log_dir: self.logs.clone(),
            state_dir: self.state.clone(),
        }
    }

    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        write_script(&self.root, name, body)
    }

    pub fn write_log(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        std::fs::create_dir_all(&self.logs).unwrap();
        let path = self.logs.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn log_names(&self) -> Vec<String> {
        dir_names(&self.logs)
    }
}

pub fn dir_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
        .collect();
    names.sort();
    names
}

/// Engine with a fake launcher and probe; records kept in memory.
pub fn fake_engine(ws: &Workspace, cfg: &ConfigFile) -> (Engine, Arc<FakeLauncher>, FakeProbe) {
    fake_engine_with(ws, cfg, |launcher| launcher)
}

/// Like [`fake_engine`], letting the test tweak the launcher first.
pub fn fake_engine_with(
    ws: &Workspace,
    cfg: &ConfigFile,
    tweak: impl FnOnce(FakeLauncher) -> FakeLauncher,
) -> (Engine, Arc<FakeLauncher>, FakeProbe) {
    let probe = FakeProbe::new();
    let launcher = Arc::new(tweak(FakeLauncher::new(&ws.logs, probe.clone())));
    let guard = RunGuard::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(probe.clone()),
    );
    let engine = Engine::with_parts(
        cfg,
        ws.paths(),
        Arc::new(RealFileSystem),
        guard,
        launcher.clone(),
    )
    .unwrap();
    (engine, launcher, probe)
}
