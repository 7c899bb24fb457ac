// src/logs/mod.rs

//! Log files: naming, listing and safe lookup.
//!
//! Logs are append-only files written by exactly one detached child each.
//! Nothing in this module writes to them; it only names, lists and resolves.

pub mod naming;
pub mod store;
pub mod title;

pub use naming::{format_when, LogName, UNKNOWN_WHEN};
pub use store::{LogEntry, LogStore};
pub use title::TitleResolver;
