// tests/relative_config.rs
//
// Changes the process working directory, so it lives in its own test binary
// and holds a single test.

#![cfg(unix)]

mod common;

use std::path::Path;
use std::time::Duration;

use jobwatch::config::{load_and_validate, ROOT_ENV_VAR};
use jobwatch::engine::{Engine, EnginePaths};
use jobwatch::types::{ReadMode, TaskStatus};

use common::{init_tracing, with_timeout, write_script};

#[tokio::test]
async fn config_loaded_through_relative_path_launches_from_absolute_root() {
    init_tracing();
    if std::env::var_os(ROOT_ENV_VAR).is_some() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let api = base.join("demos/api");
    std::fs::create_dir_all(&api).unwrap();
    write_script(&api, "job.sh", "echo 'Total assets found: 5'");
    std::fs::write(
        base.join("demos/Jobwatch.toml"),
        r#"
[config]
log_dir = "logs"
state_dir = ".jobwatch"

[registry]
root = "api"

[task.job]
cmd = ["/bin/sh", "job.sh"]
"#,
    )
    .unwrap();

    std::env::set_current_dir(&base).unwrap();
    let cfg = load_and_validate("demos/Jobwatch.toml").unwrap();

    let paths = EnginePaths::resolve(&cfg, Path::new("demos")).unwrap();
    assert!(paths.root.is_absolute());
    assert_eq!(paths.root, base.join("demos/api"));
    assert_eq!(paths.log_dir, base.join("demos/logs"));

    let engine = Engine::from_config(&cfg, Path::new("demos")).unwrap();
    let def = engine.registry().resolve("job").unwrap();
    assert_eq!(def.cwd, api);
    assert_eq!(def.argv[1], api.join("job.sh").to_string_lossy());

    let launched = engine.launch("job").await.unwrap();
    assert!(launched.log_path.starts_with(base.join("demos/logs")));

    with_timeout(async {
        while engine.status(&launched.log_name).unwrap() != TaskStatus::Success {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await;
    assert_eq!(
        engine.read(&launched.log_name, ReadMode::Raw).unwrap(),
        "Total assets found: 5\n"
    );
}
