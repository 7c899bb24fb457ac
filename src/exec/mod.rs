// src/exec/mod.rs

//! Process launch layer.
//!
//! - [`launcher`] spawns a task with its combined output redirected to a new
//!   log file and returns without waiting.
//! - [`detach`] hides the per-OS detachment mechanics behind one capability.
//! - [`backend`] provides the `LaunchBackend` trait the engine is written
//!   against, so tests can replace real processes.

pub mod backend;
pub mod detach;
pub mod launcher;

pub use backend::{LaunchBackend, LaunchFuture, Launched};
pub use detach::DetachStrategy;
pub use launcher::ProcessLauncher;
