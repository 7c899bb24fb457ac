// tests/engine_fake_launcher.rs

mod common;

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use jobwatch::engine::Engine;
use jobwatch::errors::JobwatchError;
use jobwatch::fs::RealFileSystem;
use jobwatch::guard::{MemoryRecordStore, RecordStore, RunGuard, RunRecord};
use jobwatch::logs::LogName;
use jobwatch::types::{ReadMode, TaskStatus};

use common::{
    fake_engine, fake_engine_with, init_tracing, FakeLauncher, FakeProbe, TaskConfigBuilder,
    Workspace,
};

fn interpreter_config(ws: &Workspace) -> jobwatch::config::ConfigFile {
    ws.script("run_interpreter.sh", "/bin/sh \"$1\"");
    ws.script("API_interface_ME_ver00.py", "echo payload");
    ws.config()
        .with_task(
            "qr_api_me",
            TaskConfigBuilder::new(["/bin/bash", "run_interpreter.sh", "API_interface_ME_ver00.py"])
                .label("AI Interpreter – Mechanical")
                .build(),
        )
        .build()
}

#[tokio::test]
async fn launch_returns_log_named_after_stem() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, launcher, _probe) = fake_engine(&ws, &cfg);

    let launched = engine.launch("qr_api_me").await.unwrap();

    assert_eq!(launched.log_name, "API_interface_ME_ver00.1755872945.log");
    assert_eq!(launched.log_path, ws.logs.join(&launched.log_name));
    assert!(launched.log_path.is_file());
    assert_eq!(launcher.launched(), vec!["qr_api_me"]);

    let record = engine.guard().last_record("qr_api_me").unwrap().unwrap();
    assert_eq!(record.pid, launched.pid);
    assert_eq!(record.log_path, launched.log_path);
}

#[tokio::test]
async fn second_launch_while_alive_reports_first_pid() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, launcher, _probe) = fake_engine(&ws, &cfg);

    let first = engine.launch("qr_api_me").await.unwrap();
    match engine.launch("qr_api_me").await {
        Err(JobwatchError::AlreadyRunning { key, pid }) => {
            assert_eq!(key, "qr_api_me");
            assert_eq!(pid, first.pid);
        }
        other => panic!("Expected AlreadyRunning, got: {:?}", other),
    }

    // Refused launches never reach the launcher and leave no extra log.
    assert_eq!(launcher.launched().len(), 1);
    assert_eq!(ws.log_names().len(), 1);
}

#[tokio::test]
async fn relaunch_after_exit_creates_new_log() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, _launcher, probe) = fake_engine(&ws, &cfg);

    let first = engine.launch("qr_api_me").await.unwrap();
    probe.set_dead(first.pid);

    let second = engine.launch("qr_api_me").await.unwrap();
    assert_ne!(second.pid, first.pid);
    assert_ne!(second.log_name, first.log_name);
    assert_eq!(
        engine.guard().last_record("qr_api_me").unwrap().unwrap().pid,
        second.pid
    );
    assert_eq!(ws.log_names().len(), 2);
}

#[tokio::test]
async fn spawn_failure_leaves_no_record() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, _launcher, _probe) =
        fake_engine_with(&ws, &cfg, |launcher| launcher.failing_for("qr_api_me"));

    match engine.launch("qr_api_me").await {
        Err(JobwatchError::SpawnFailure { key, .. }) => assert_eq!(key, "qr_api_me"),
        other => panic!("Expected SpawnFailure, got: {:?}", other),
    }
    assert!(engine.guard().last_record("qr_api_me").unwrap().is_none());
}

#[tokio::test]
async fn unknown_key_and_missing_script_never_reach_the_launcher() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = ws
        .config()
        .with_task("gone", TaskConfigBuilder::new(["/bin/sh", "gone.sh"]).build())
        .build();
    let (engine, launcher, _probe) = fake_engine(&ws, &cfg);

    assert!(engine.launch("nope").await.unwrap_err().is_not_found());
    assert!(matches!(
        engine.launch("gone").await,
        Err(JobwatchError::ScriptMissing { .. })
    ));
    assert!(launcher.launched().is_empty());
}

#[tokio::test]
async fn status_follows_log_content() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, _launcher, _probe) = fake_engine(&ws, &cfg);

    let launched = engine.launch("qr_api_me").await.unwrap();
    assert_eq!(engine.status(&launched.log_name).unwrap(), TaskStatus::Running);

    std::fs::write(&launched.log_path, "Processing QR 0000183699\nTotal assets found: 5\n")
        .unwrap();
    assert_eq!(engine.status(&launched.log_name).unwrap(), TaskStatus::Success);

    std::fs::write(
        &launched.log_path,
        "Total assets found: 5\nTraceback (most recent call last):\n",
    )
    .unwrap();
    assert_eq!(engine.status(&launched.log_name).unwrap(), TaskStatus::Error);

    assert!(engine.status("missing.1.log").unwrap_err().is_not_found());
    assert!(engine.status("../etc/passwd").unwrap_err().is_not_found());
}

#[tokio::test]
async fn listing_is_capped_by_config_and_caller() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = ws
        .config()
        .list_limit(3)
        .with_task("a", TaskConfigBuilder::new(["true"]).build())
        .build();
    let (engine, _launcher, _probe) = fake_engine(&ws, &cfg);

    assert!(engine.list().is_empty());

    for ts in 1_700_000_000u64..1_700_000_006 {
        ws.write_log(&LogName::new("job", ts).file_name(), "x");
    }

    let rows = engine.list();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "job.1700000005.log");
    assert_eq!(engine.list_with_limit(2).len(), 2);
    assert_eq!(engine.list_with_limit(50).len(), 3);
}

#[tokio::test]
async fn read_modes_and_download() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = ws
        .config()
        .raw_limit_bytes(64)
        .with_task("a", TaskConfigBuilder::new(["true"]).build())
        .build();
    let (engine, _launcher, _probe) = fake_engine(&ws, &cfg);

    let body = "boot\nProcessing QR 7\nTotal assets found: 2\n";
    ws.write_log("job.1700000000.log", body);
    ws.write_log("big.1700000001.log", "z".repeat(100));

    assert_eq!(
        engine.read("job.1700000000.log", ReadMode::Summary).unwrap(),
        "Processing QR 7\nTotal assets found: 2"
    );
    assert_eq!(engine.read("job.1700000000.log", ReadMode::Raw).unwrap(), body);

    let oversized = engine.read("big.1700000001.log", ReadMode::Raw).unwrap();
    assert!(oversized.contains("too large"));
    assert!(engine.read("nope.log", ReadMode::Raw).unwrap_err().is_not_found());

    let mut download = engine.download("big.1700000001.log").unwrap();
    assert_eq!(download.name, "big.1700000001.log");
    let mut bytes = Vec::new();
    download.reader.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes.len(), 100);
}

#[tokio::test]
async fn tasks_overview_reports_scripts_and_runs() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = ws
        .config()
        .with_task("present", TaskConfigBuilder::new(["/bin/sh", "present.sh"]).build())
        .with_task("absent", TaskConfigBuilder::new(["/bin/sh", "absent.sh"]).build())
        .build();
    ws.script("present.sh", "echo hi");
    let (engine, _launcher, probe) = fake_engine(&ws, &cfg);

    let launched = engine.launch("present").await.unwrap();
    let tasks = engine.tasks().unwrap();
    let by_key = |k: &str| tasks.iter().find(|t| t.definition.key == k).unwrap();

    assert!(!by_key("absent").script_exists);
    assert!(by_key("absent").last_run.is_none());
    assert!(by_key("present").script_exists);
    assert!(by_key("present").alive);

    probe.set_dead(launched.pid);
    let tasks = engine.tasks().unwrap();
    let present = tasks.iter().find(|t| t.definition.key == "present").unwrap();
    assert!(!present.alive);
    assert_eq!(present.last_run.as_ref().unwrap().pid, launched.pid);
}

#[tokio::test]
async fn concurrent_launches_of_one_key_can_both_pass_the_guard() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let (engine, launcher, _probe) = fake_engine(&ws, &cfg);

    // Neither call has recorded its pid when the other one checks.
    let (a, b) = tokio::join!(engine.launch("qr_api_me"), engine.launch("qr_api_me"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.pid, b.pid);
    assert_ne!(a.log_name, b.log_name);
    assert_eq!(launcher.launched(), vec!["qr_api_me", "qr_api_me"]);
    assert_eq!(ws.log_names().len(), 2);

    // Whichever recorded last now blocks further launches.
    assert!(matches!(
        engine.launch("qr_api_me").await,
        Err(JobwatchError::AlreadyRunning { .. })
    ));
}

#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryRecordStore,
    loads: AtomicUsize,
}

impl RecordStore for CountingStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<RunRecord>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(key)
    }

    fn save(&self, record: &RunRecord) -> anyhow::Result<()> {
        self.inner.save(record)
    }
}

#[tokio::test]
async fn tasks_overview_reads_each_record_once() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_config(&ws);
    let probe = FakeProbe::new();
    let store = Arc::new(CountingStore::default());
    store
        .save(&RunRecord::new("qr_api_me", 31, ws.logs.join("x.1.log")))
        .unwrap();
    probe.set_alive(31);

    let guard = RunGuard::new(store.clone(), Arc::new(probe.clone()));
    let engine = Engine::with_parts(
        &cfg,
        ws.paths(),
        Arc::new(RealFileSystem),
        guard,
        Arc::new(FakeLauncher::new(&ws.logs, probe)),
    )
    .unwrap();

    let tasks = engine.tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].alive);
    assert_eq!(tasks[0].last_run.as_ref().unwrap().pid, 31);
    assert_eq!(store.loads.load(Ordering::SeqCst), 1);
}
