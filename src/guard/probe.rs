// src/guard/probe.rs

//! Process liveness probing.
//!
//! A probe only answers "does *some* process with this pid exist". Once the
//! original child has exited the OS may hand its pid to an unrelated
//! process, in which case the probe reports a stale run as alive.

/// Capability: is a process with this pid currently present?
pub trait ProcessProbe: Send + Sync + std::fmt::Debug {
    fn is_alive(&self, pid: u32) -> bool;
}

/// Probe backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessProbe;

impl ProcessProbe for OsProcessProbe {
    fn is_alive(&self, pid: u32) -> bool {
        is_pid_alive(pid)
    }
}

/// Existence check via `kill(pid, 0)`; no signal is delivered.
#[cfg(unix)]
fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };

    // SAFETY: signal 0 performs error checking only.
    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return true;
    }
    // EPERM: the process exists but belongs to someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn is_pid_alive(pid: u32) -> bool {
    tracing::warn!(
        pid,
        "process liveness probing is unsupported on this platform; assuming exited"
    );
    false
}
