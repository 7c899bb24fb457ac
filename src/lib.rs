// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod guard;
pub mod inspect;
pub mod logging;
pub mod logs;
pub mod registry;
pub mod types;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::config::load_and_validate;
use crate::engine::Engine;
use crate::logs::LogEntry;
use crate::types::TaskStatus;

/// High-level entry point used by `main.rs`.
///
/// Loads the config once, builds the engine from it and runs exactly one
/// subcommand against it.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;

    let engine = Engine::from_config(&cfg, &config_root_dir(&config_path)?)?;
    debug!(
        tasks = engine.registry().len(),
        root = ?engine.registry().root(),
        logs = ?engine.logs().dir(),
        "engine ready"
    );

    let mut out = io::stdout();
    match args.command {
        Command::Tasks => print_tasks(&engine, &mut out)?,
        Command::Launch { key } => {
            let launched = engine.launch(&key).await?;
            writeln!(out, "{}", launched.log_name)?;
        }
        Command::Status {
            name,
            wait,
            interval,
            timeout,
        } => {
            let status = if wait {
                wait_for_terminal(&engine, &name, interval, timeout).await?
            } else {
                engine.status(&name)?
            };
            writeln!(out, "{status}")?;
        }
        Command::List { limit } => {
            let rows = match limit {
                Some(n) => engine.list_with_limit(n),
                None => engine.list(),
            };
            print_listing(&rows, &mut out)?;
        }
        Command::Read { name, mode } => {
            let text = engine.read(&name, mode.into())?;
            writeln!(out, "{text}")?;
        }
        Command::Download { name, output } => {
            let mut download = engine.download(&name)?;
            match output {
                Some(path) => {
                    let mut file = std::fs::File::create(&path)
                        .with_context(|| format!("creating {:?}", path))?;
                    io::copy(&mut download.reader, &mut file)?;
                }
                None => {
                    io::copy(&mut download.reader, &mut out)?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Poll a log until it reports a terminal status.
///
/// `timeout_secs == 0` waits forever.
async fn wait_for_terminal(
    engine: &Engine,
    name: &str,
    interval_secs: u64,
    timeout_secs: u64,
) -> Result<TaskStatus> {
    let deadline = (timeout_secs > 0).then(|| Instant::now() + Duration::from_secs(timeout_secs));
    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let status = engine.status(name)?;
        if status.is_terminal() {
            return Ok(status);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            bail!("log {name} still running after {timeout_secs}s");
        }
        debug!(log = %name, "still running");
    }
}

/// Figure out the directory relative config paths are anchored at.
///
/// - `configs/Jobwatch.toml` → `<cwd>/configs`
/// - bare `Jobwatch.toml` (parent = "") → the current working directory
fn config_root_dir(config_path: &Path) -> Result<PathBuf> {
    let parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::path::absolute(parent).with_context(|| format!("locating {:?}", parent))
}

fn print_tasks(engine: &Engine, out: &mut impl Write) -> Result<()> {
    let tasks = engine.tasks()?;
    writeln!(out, "tasks ({}):", tasks.len())?;
    for task in tasks {
        let def = &task.definition;
        writeln!(out, "  - {} ({})", def.key, def.display_label())?;
        writeln!(out, "      cmd: {:?}", def.argv)?;
        writeln!(out, "      cwd: {}", def.cwd.display())?;
        match def.script {
            Some(ref script) => writeln!(
                out,
                "      script: {} ({})",
                script.display(),
                if task.script_exists { "present" } else { "MISSING" }
            )?,
            None => writeln!(out, "      script: -")?,
        }
        if let Some(ref run) = task.last_run {
            writeln!(
                out,
                "      last run: pid {} at {} -> {} ({})",
                run.pid,
                run.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                run.log_name().unwrap_or("?"),
                if task.alive { "alive" } else { "exited" }
            )?;
        }
    }
    Ok(())
}

fn print_listing(rows: &[LogEntry], out: &mut impl Write) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "no logs")?;
        return Ok(());
    }
    for row in rows {
        writeln!(
            out,
            "{:<19}  {:>8}  {:<32}  {}",
            row.when,
            row.size_kb(),
            row.title,
            row.name
        )?;
    }
    Ok(())
}
