// src/exec/detach.rs

//! Detaching children from the launching process.
//!
//! The rest of the crate only sees [`DetachStrategy::apply`]; which OS
//! mechanism backs it is decided once by [`DetachStrategy::for_current_os`].

use tokio::process::Command;

/// How a spawned child is cut loose from this process's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachStrategy {
    /// Unix: `setsid()` in the child, giving it its own session and process
    /// group, with no controlling terminal.
    NewSession,
    /// Windows: `CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS`.
    DetachedProcessGroup,
    /// Plain spawn. The child still outlives us unless the OS tears down
    /// the whole group.
    Inherit,
}

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;

impl DetachStrategy {
    pub fn for_current_os() -> Self {
        if cfg!(unix) {
            DetachStrategy::NewSession
        } else if cfg!(windows) {
            DetachStrategy::DetachedProcessGroup
        } else {
            DetachStrategy::Inherit
        }
    }

    /// Configure `cmd` so the child survives the exit of this process.
    pub fn apply(self, cmd: &mut Command) {
        // Never tie the child to the `Child` handle we are about to drop.
        cmd.kill_on_drop(false);

        match self {
            DetachStrategy::NewSession => apply_new_session(cmd),
            DetachStrategy::DetachedProcessGroup => apply_detached_group(cmd),
            DetachStrategy::Inherit => {}
        }
    }
}

#[cfg(unix)]
fn apply_new_session(cmd: &mut Command) {
    // SAFETY: `setsid` is async-signal-safe and touches no parent state.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn apply_new_session(_cmd: &mut Command) {
    tracing::warn!("new-session detachment is only available on Unix; spawning attached");
}

#[cfg(windows)]
fn apply_detached_group(cmd: &mut Command) {
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS);
}

#[cfg(not(windows))]
fn apply_detached_group(_cmd: &mut Command) {
    tracing::warn!("detached process groups are only available on Windows; spawning attached");
}
