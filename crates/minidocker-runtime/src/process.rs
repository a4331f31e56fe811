//! Process launching inside fresh namespaces (parent side).
//!
//! Builds an unstarted [`ContainerCommand`] that, when spawned, clones
//! a child into new UTS/PID/mount/network/IPC namespaces and re-executes
//! the current binary with the internal `init` subcommand. The user
//! command travels separately, over a pipe the child inherits on FD 3.

use std::io::Write;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use minidocker_common::error::{MinidockerError, Result};
use minidocker_core::filesystem::overlayfs;
use minidocker_core::namespace::NamespaceConfig;

use crate::pipe;

/// An unstarted container launch plan.
///
/// Created by [`new_process`]; consumed by [`ContainerCommand::spawn`].
pub struct ContainerCommand {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    merged_dir: PathBuf,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    namespaces: NamespaceConfig,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    tty: bool,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    read_end: OwnedFd,
    /// Raw number of the write end. The cloned child inherits the whole
    /// descriptor table and must close its copy, or reading FD 3 to EOF
    /// would block forever.
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    write_fd: i32,
}

/// Prepares a container launch: creates the init pipe and assembles the
/// overlay workspace under `root_dir`.
///
/// Returns the unstarted command and the pipe write end the caller
/// later feeds through [`send_init_command`]. The child's working
/// directory is set to the merged overlay, which the init bootstrap
/// pivots into.
///
/// # Errors
///
/// Returns an error if the pipe cannot be created or the workspace
/// cannot be assembled.
pub fn new_process(
    root_dir: &Path,
    volume: Option<&str>,
    tty: bool,
) -> Result<(ContainerCommand, OwnedFd)> {
    let (read_end, write_end) = nix::unistd::pipe().map_err(|e| MinidockerError::Syscall {
        message: format!("pipe creation failed: {e}"),
    })?;

    let merged_dir = overlayfs::new_workspace(root_dir, volume)?;
    tracing::info!(merged = %merged_dir.display(), tty, "container process prepared");

    let write_fd = {
        use std::os::fd::AsRawFd;
        write_end.as_raw_fd()
    };
    Ok((
        ContainerCommand {
            merged_dir,
            namespaces: NamespaceConfig::default(),
            tty,
            read_end,
            write_fd,
        },
        write_end,
    ))
}

/// Writes the framed user command to the pipe and closes the write end.
///
/// Closing is what unblocks the child: it reads FD 3 to EOF before it
/// execs, so the parent finishes cgroup configuration first and calls
/// this last.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn send_init_command(args: &[String], write_end: OwnedFd) -> Result<()> {
    tracing::info!(command = %args.join(" "), "sending init command");
    let mut file = std::fs::File::from(write_end);
    file.write_all(&pipe::encode_args(args))
        .map_err(|e| MinidockerError::Syscall {
            message: format!("init pipe write failed: {e}"),
        })
    // Dropping the file closes the write end and delivers EOF.
}

#[cfg(target_os = "linux")]
impl ContainerCommand {
    /// Clones the container child and returns its PID in the parent's
    /// namespace.
    ///
    /// The child re-executes `/proc/self/exe init`; everything up to
    /// the `execv` runs on the cloned stack below.
    ///
    /// # Errors
    ///
    /// Returns an error if `clone(2)` fails.
    pub fn spawn(self) -> Result<nix::unistd::Pid> {
        use std::os::fd::AsRawFd;

        const STACK_SIZE: usize = 1024 * 1024;
        let mut stack = vec![0u8; STACK_SIZE];

        let merged = self.merged_dir.clone();
        let read_fd = self.read_end.as_raw_fd();
        let write_fd = self.write_fd;
        let tty = self.tty;

        // SAFETY: the callback runs in the cloned child without CLONE_VM,
        // so it owns a copy of the address space; it only sets up
        // descriptors and execs, returning a plain exit code on failure.
        let pid = unsafe {
            nix::sched::clone(
                Box::new(|| child_entry(&merged, read_fd, write_fd, tty)),
                &mut stack,
                self.namespaces.clone_flags(),
                Some(nix::sys::signal::Signal::SIGCHLD as i32),
            )
        }
        .map_err(|e| MinidockerError::Syscall {
            message: format!("clone failed: {e}"),
        })?;

        tracing::info!(pid = pid.as_raw(), "container process started");
        Ok(pid)
        // Dropping self closes the parent's copy of the read end; the
        // child keeps its own.
    }
}

#[cfg(not(target_os = "linux"))]
impl ContainerCommand {
    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — namespace cloning requires Linux.
    pub fn spawn(self) -> Result<nix::unistd::Pid> {
        Err(MinidockerError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}

/// Entry point of the cloned child: runs between `clone` and `execv`.
#[cfg(target_os = "linux")]
fn child_entry(merged: &Path, read_fd: i32, write_fd: i32, tty: bool) -> isize {
    match reexec_as_init(merged, read_fd, write_fd, tty) {
        Ok(infallible) => match infallible {},
        Err(e) => {
            eprintln!("minidocker: container setup failed: {e}");
            1
        }
    }
}

#[cfg(target_os = "linux")]
fn reexec_as_init(
    merged: &Path,
    read_fd: i32,
    write_fd: i32,
    tty: bool,
) -> Result<std::convert::Infallible> {
    use std::ffi::CString;

    use minidocker_common::constants::INIT_PIPE_FD;

    // Only the parent writes; EOF on the read end needs every write-end
    // copy in this process gone before exec.
    let _ = nix::unistd::close(write_fd);

    if !tty {
        detach_stdio()?;
    }

    // FD 3 contract: the init pipe is the first descriptor after stdio.
    if read_fd != INIT_PIPE_FD {
        nix::unistd::dup2(read_fd, INIT_PIPE_FD).map_err(|e| MinidockerError::Syscall {
            message: format!("dup2 of init pipe failed: {e}"),
        })?;
        let _ = nix::unistd::close(read_fd);
    }

    std::env::set_current_dir(merged).map_err(|e| MinidockerError::Io {
        path: merged.to_path_buf(),
        source: e,
    })?;

    let exe = CString::new("/proc/self/exe").map_err(|_| MinidockerError::Config {
        message: "self-exe path contains NUL".into(),
    })?;
    let init = CString::new("init").map_err(|_| MinidockerError::Config {
        message: "init argument contains NUL".into(),
    })?;
    match nix::unistd::execv(&exe, &[exe.clone(), init]) {
        Ok(infallible) => Ok(infallible),
        Err(e) => Err(MinidockerError::Syscall {
            message: format!("re-exec of /proc/self/exe failed: {e}"),
        }),
    }
}

/// Points stdin/stdout/stderr at `/dev/null` for a detached container.
#[cfg(target_os = "linux")]
fn detach_stdio() -> Result<()> {
    use std::os::fd::AsRawFd;

    let null = std::fs::File::options()
        .read(true)
        .write(true)
        .open("/dev/null")
        .map_err(|e| MinidockerError::Io {
            path: "/dev/null".into(),
            source: e,
        })?;
    for fd in 0..3 {
        nix::unistd::dup2(null.as_raw_fd(), fd).map_err(|e| MinidockerError::Syscall {
            message: format!("dup2 of /dev/null onto fd {fd} failed: {e}"),
        })?;
    }
    Ok(())
}
