use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use jobwatch::errors::JobwatchError;
use jobwatch::exec::{LaunchBackend, LaunchFuture, Launched};
use jobwatch::guard::ProcessProbe;
use jobwatch::logs::LogName;
use jobwatch::registry::TaskDefinition;

/// Probe whose answers are set by the test.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    alive: Arc<Mutex<HashSet<u32>>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alive(&self, pid: u32) {
        self.alive.lock().unwrap().insert(pid);
    }

    pub fn set_dead(&self, pid: u32) {
        self.alive.lock().unwrap().remove(&pid);
    }
}

impl ProcessProbe for FakeProbe {
    fn is_alive(&self, pid: u32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }
}

/// A launcher that:
/// - records which task keys were launched
/// - yields to the runtime once, like a real spawn awaiting the OS
/// - writes an empty log per launch (timestamps tick one second per call)
/// - hands out increasing fake pids, marking them alive on `probe`
/// - fails with `SpawnFailure` for keys listed in `failing`.
#[derive(Debug)]
pub struct FakeLauncher {
    log_dir: PathBuf,
    probe: FakeProbe,
    next_pid: AtomicU32,
    clock: AtomicU64,
    launched: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeLauncher {
    pub fn new(log_dir: impl Into<PathBuf>, probe: FakeProbe) -> Self {
        Self {
            log_dir: log_dir.into(),
            probe,
            next_pid: AtomicU32::new(1000),
            clock: AtomicU64::new(1_755_872_945),
            launched: Arc::new(Mutex::new(Vec::new())),
            failing: HashSet::new(),
        }
    }

    pub fn failing_for(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl LaunchBackend for FakeLauncher {
    fn launch<'a>(&'a self, def: &'a TaskDefinition) -> LaunchFuture<'a> {
        Box::pin(async move {
            self.launched.lock().unwrap().push(def.key.clone());
            tokio::task::yield_now().await;

            if self.failing.contains(&def.key) {
                return Err(JobwatchError::SpawnFailure {
                    key: def.key.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
                });
            }

            let name = LogName::new(&def.stem, self.clock.fetch_add(1, Ordering::SeqCst));
            let log_name = name.file_name();
            let log_path = self.log_dir.join(&log_name);
            std::fs::create_dir_all(&self.log_dir)?;
            std::fs::write(&log_path, b"")?;

            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            self.probe.set_alive(pid);

            Ok(Launched {
                pid,
                log_path,
                log_name,
            })
        })
    }
}
