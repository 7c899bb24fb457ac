// src/engine/mod.rs

//! Orchestration for jobwatch.
//!
//! A launch request flows through:
//! registry resolve → run guard check → launcher spawn → run record write.
//! Status and read requests resolve a log name through the log store and hand
//! the path to the inspectors. Nothing here blocks on a child process.

pub mod service;

pub use service::{Download, Engine, EnginePaths, TaskOverview};
