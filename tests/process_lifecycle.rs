// tests/process_lifecycle.rs
//
// Real detached processes on Unix: spawn, duplicate refusal, log capture and
// status inference against what the child actually prints.

#![cfg(unix)]

mod common;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jobwatch::config::ConfigFile;
use jobwatch::engine::Engine;
use jobwatch::errors::JobwatchError;
use jobwatch::exec::{DetachStrategy, LaunchBackend, ProcessLauncher};
use jobwatch::logs::LogName;
use jobwatch::registry::TaskRegistry;
use jobwatch::types::{ReadMode, TaskStatus};

use common::{init_tracing, with_timeout, TaskConfigBuilder, Workspace};

fn interpreter_task(ws: &Workspace, payload: &str) -> ConfigFile {
    ws.script("run_interpreter.sh", "exec /bin/sh \"$1\"");
    ws.script("API_interface_ME_ver00.py", payload);
    ws.config()
        .with_task(
            "qr_api_me",
            TaskConfigBuilder::new(["/bin/sh", "run_interpreter.sh", "API_interface_ME_ver00.py"])
                .build(),
        )
        .build()
}

fn engine(ws: &Workspace, cfg: &ConfigFile) -> Engine {
    Engine::from_config(cfg, &ws.root).unwrap()
}

async fn wait_for_status(engine: &Engine, name: &str, want: TaskStatus) {
    with_timeout(async {
        loop {
            if engine.status(name).unwrap() == want {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
}

#[tokio::test]
async fn status_moves_from_running_to_success() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_task(
        &ws,
        "echo 'Processing QR 0000183699'\nsleep 1\necho 'Total assets found: 5'",
    );
    let engine = engine(&ws, &cfg);

    let launched = engine.launch("qr_api_me").await.unwrap();
    assert!(launched.log_name.starts_with("API_interface_ME_ver00."));
    assert!(launched.log_name.ends_with(".log"));
    assert_eq!(engine.status(&launched.log_name).unwrap(), TaskStatus::Running);

    wait_for_status(&engine, &launched.log_name, TaskStatus::Success).await;
    assert_eq!(
        engine.read(&launched.log_name, ReadMode::Summary).unwrap(),
        "Processing QR 0000183699\nTotal assets found: 5"
    );
}

#[tokio::test]
async fn second_launch_is_refused_while_first_runs() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_task(&ws, "sleep 3\necho Done");
    let engine = engine(&ws, &cfg);

    let first = engine.launch("qr_api_me").await.unwrap();
    match engine.launch("qr_api_me").await {
        Err(JobwatchError::AlreadyRunning { pid, .. }) => assert_eq!(pid, first.pid),
        other => panic!("Expected AlreadyRunning, got: {:?}", other),
    }
    assert_eq!(ws.log_names(), vec![first.log_name.clone()]);

    // The record is on disk, so a fresh engine refuses too.
    assert!(ws.state.join("qr_api_me.json").is_file());
    let restarted = Engine::from_config(&cfg, &ws.root).unwrap();
    assert!(matches!(
        restarted.launch("qr_api_me").await,
        Err(JobwatchError::AlreadyRunning { .. })
    ));
}

#[tokio::test]
async fn traceback_is_reported_as_error() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_task(
        &ws,
        "echo 'Saved partial.csv'\n\
         echo 'Traceback (most recent call last):' 1>&2\n\
         echo 'ValueError: boom' 1>&2",
    );
    let engine = engine(&ws, &cfg);

    let launched = engine.launch("qr_api_me").await.unwrap();
    wait_for_status(&engine, &launched.log_name, TaskStatus::Error).await;

    let raw = engine.read(&launched.log_name, ReadMode::Raw).unwrap();
    assert!(raw.contains("ValueError: boom"));
}

#[tokio::test]
async fn child_runs_in_cwd_with_utf8_environment() {
    init_tracing();
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.root.join("work")).unwrap();
    ws.script(
        "env_probe.sh",
        "echo \"cwd=$(pwd -P)\"\necho \"enc=$PYTHONIOENCODING utf8=$PYTHONUTF8\"\necho Done",
    );
    let cfg = ws
        .config()
        .with_task(
            "probe",
            TaskConfigBuilder::new(["/bin/sh", "env_probe.sh"]).cwd("work").build(),
        )
        .build();
    let engine = engine(&ws, &cfg);

    let launched = engine.launch("probe").await.unwrap();
    wait_for_status(&engine, &launched.log_name, TaskStatus::Success).await;

    let raw = engine.read(&launched.log_name, ReadMode::Raw).unwrap();
    assert!(raw.contains(&format!("cwd={}", ws.root.join("work").display())), "{raw}");
    assert!(raw.contains("enc=utf-8 utf8=1"), "{raw}");
}

#[tokio::test]
async fn spawn_failure_removes_the_log_and_records_nothing() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = ws
        .config()
        .with_task(
            "ghost",
            TaskConfigBuilder::new(["jobwatch-test-no-such-program"]).build(),
        )
        .build();
    let engine = engine(&ws, &cfg);

    match engine.launch("ghost").await {
        Err(JobwatchError::SpawnFailure { key, .. }) => assert_eq!(key, "ghost"),
        other => panic!("Expected SpawnFailure, got: {:?}", other),
    }
    assert!(ws.log_names().is_empty());
    assert!(engine.guard().last_record("ghost").unwrap().is_none());
}

#[tokio::test]
async fn child_leads_its_own_session() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_task(&ws, "sleep 2\necho Done");
    let engine = engine(&ws, &cfg);

    let launched = engine.launch("qr_api_me").await.unwrap();
    let pid = libc::pid_t::try_from(launched.pid).unwrap();

    // SAFETY: getsid only reads process attributes.
    let (child_sid, own_sid) = unsafe { (libc::getsid(pid), libc::getsid(0)) };
    assert_eq!(child_sid, pid);
    assert_ne!(child_sid, own_sid);
}

#[tokio::test]
async fn same_second_name_collision_fails_and_keeps_existing_log() {
    init_tracing();
    let ws = Workspace::new();
    let cfg = interpreter_task(&ws, "echo 'Total assets found: 5'");
    let registry = TaskRegistry::from_config(&cfg, &ws.root);
    let def = registry.resolve("qr_api_me").unwrap();

    // Occupy every name the launcher could pick in the next few seconds.
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let taken: Vec<String> = (now..now + 5)
        .map(|ts| LogName::new(&def.stem, ts).file_name())
        .collect();
    for name in &taken {
        ws.write_log(name, "earlier run\n");
    }

    let launcher = ProcessLauncher::new(&ws.logs, DetachStrategy::for_current_os());
    match launcher.launch(def).await {
        Err(JobwatchError::SpawnFailure { key, source }) => {
            assert_eq!(key, "qr_api_me");
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("Expected SpawnFailure, got: {:?}", other),
    }

    assert_eq!(ws.log_names(), taken);
    for name in &taken {
        assert_eq!(
            std::fs::read_to_string(ws.logs.join(name)).unwrap(),
            "earlier run\n"
        );
    }
}
