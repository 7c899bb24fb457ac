// src/exec/backend.rs

//! Pluggable launch backend.
//!
//! The engine talks to a `LaunchBackend` instead of spawning directly, so
//! tests can swap in a launcher that records calls and hands out fake pids
//! while the production path uses [`super::launcher::ProcessLauncher`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;
use crate::registry::TaskDefinition;

/// What a successful launch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub pid: u32,
    pub log_path: PathBuf,
    /// File name of `log_path`; the identifier callers poll with.
    pub log_name: String,
}

pub type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<Launched>> + Send + 'a>>;

/// Trait abstracting how a resolved task is started.
pub trait LaunchBackend: Send + Sync + std::fmt::Debug {
    /// Start `def` without waiting for it.
    ///
    /// Implementations must leave no log file behind when they fail.
    fn launch<'a>(&'a self, def: &'a TaskDefinition) -> LaunchFuture<'a>;
}
