//! Container launch orchestration (parent side).
//!
//! Sequences the launch path: workspace and pipe, clone, cgroup
//! configuration, command handoff, wait, teardown. The pipe is the
//! barrier that keeps the child from exec'ing before its PID sits in
//! the configured cgroup.

use std::path::PathBuf;
use std::sync::PoisonError;

use minidocker_common::constants::CGROUP_NAME;
use minidocker_common::error::{MinidockerError, Result};
use minidocker_common::types::ResourceConfig;
use minidocker_core::cgroup;
use minidocker_core::filesystem::overlayfs;

use crate::process;

/// Everything a single foreground container run needs.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// User command and its arguments; must not be empty.
    pub command: Vec<String>,
    /// Workspace root holding the base image tarball.
    pub root_dir: PathBuf,
    /// Optional `host:container` bind volume.
    pub volume: Option<String>,
    /// Attach the parent's stdio to the container.
    pub tty: bool,
    /// Cgroup v2 limits to apply before the command runs.
    pub resources: ResourceConfig,
}

/// Runs a container in the foreground and returns its exit code.
///
/// Workspace and cgroup teardown run regardless of how the child ends.
/// Cgroup initialization failure does not abort the run; the container
/// simply runs without limits and the error is logged.
///
/// # Errors
///
/// Returns an error for an empty command, a failed workspace build, or
/// a failed clone. Child failures are reported through the exit code.
#[cfg(target_os = "linux")]
pub fn run_container(config: &LaunchConfig) -> Result<i32> {
    if config.command.is_empty() {
        return Err(MinidockerError::Config {
            message: "missing container command".into(),
        });
    }

    let volume = config.volume.as_deref();
    let (command, write_end) = process::new_process(&config.root_dir, volume, config.tty)?;

    let pid = match command.spawn() {
        Ok(pid) => pid,
        Err(e) => {
            overlayfs::delete_workspace(&config.root_dir, volume);
            return Err(e);
        }
    };

    // The child blocks reading the init pipe, so limits land before
    // the user command starts.
    apply_resource_limits(pid.as_raw(), &config.resources);

    if let Err(e) = process::send_init_command(&config.command, write_end) {
        tracing::error!(error = %e, "failed to send init command");
    }

    let exit_code = wait_for_exit(pid);

    teardown_cgroup();
    overlayfs::delete_workspace(&config.root_dir, volume);

    Ok(exit_code)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — containers require Linux.
#[cfg(not(target_os = "linux"))]
pub fn run_container(_config: &LaunchConfig) -> Result<i32> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Creates the fixed cgroup, writes the limits, and attaches the child.
///
/// Set/apply failures are surfaced in the log but never abort the run,
/// and a sticky manager-initialization failure downgrades the run to
/// unlimited.
#[cfg(target_os = "linux")]
fn apply_resource_limits(pid: i32, res: &ResourceConfig) {
    let manager = match cgroup::acquire() {
        Ok(manager) => manager,
        Err(e) => {
            tracing::warn!(error = %e, "cgroups unavailable, running without resource limits");
            return;
        }
    };

    let mut mgr = manager.lock().unwrap_or_else(PoisonError::into_inner);
    let applied = mgr
        .create_cgroup(CGROUP_NAME)
        .and_then(|()| mgr.set(CGROUP_NAME, res))
        .and_then(|()| mgr.apply(CGROUP_NAME, pid));
    if let Err(e) = applied {
        tracing::error!(error = %e, "failed to apply resource limits");
    }
}

/// Best-effort removal of the run's cgroup.
#[cfg(target_os = "linux")]
fn teardown_cgroup() {
    let Ok(manager) = cgroup::acquire() else {
        return;
    };
    let mut mgr = manager.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = mgr.destroy(CGROUP_NAME) {
        tracing::warn!(error = %e, "cgroup teardown failed");
    }
}

/// Waits for the child and folds its fate into an exit code.
#[cfg(target_os = "linux")]
fn wait_for_exit(pid: nix::unistd::Pid) -> i32 {
    use nix::sys::wait::{waitpid, WaitStatus};

    match waitpid(pid, None) {
        Ok(WaitStatus::Exited(_, code)) => {
            tracing::info!(code, "container exited");
            code
        }
        Ok(WaitStatus::Signaled(_, signal, _)) => {
            tracing::info!(signal = %signal, "container killed by signal");
            128 + signal as i32
        }
        Ok(status) => {
            tracing::warn!(status = ?status, "unexpected wait status");
            1
        }
        Err(e) => {
            tracing::error!(error = %e, "wait for container failed");
            1
        }
    }
}
