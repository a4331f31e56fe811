//! Container init bootstrap (child side).
//!
//! Runs as PID 1 inside the fresh namespaces when the binary is invoked
//! with the internal `init` subcommand. Finishes the mount bootstrap,
//! reads the user command from the init pipe, and execs it — in that
//! strict order, because the pipe read is what holds the exec back
//! until the parent has finished cgroup configuration.

use std::path::{Path, PathBuf};

use minidocker_common::error::{MinidockerError, Result};

/// Runs the init bootstrap and execs the user command.
///
/// On success this never returns; the process image is replaced.
///
/// # Errors
///
/// Returns an error if the mount bootstrap fails, the pipe carries no
/// command, the executable cannot be resolved, or the exec itself
/// fails. Every one of these is fatal to the container.
#[cfg(target_os = "linux")]
pub fn init_container() -> Result<std::convert::Infallible> {
    setup_rootfs()?;

    let args = read_init_command()?;
    if args.is_empty() {
        return Err(MinidockerError::Config {
            message: "no command to run in container".into(),
        });
    }

    let executable = resolve_executable(&args[0])?;
    tracing::info!(executable = %executable.display(), args = ?args, "handing off to user command");
    exec_user_command(&executable, &args)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — the init bootstrap requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn init_container() -> Result<std::convert::Infallible> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Pivots into the merged overlay and remounts the pseudo-filesystems.
///
/// The launcher set the working directory to the merged overlay before
/// exec, so the current directory is the new root. Propagation must be
/// private before the pivot's bind mount, and the old root must be
/// detached before anything is mounted on the new one.
#[cfg(target_os = "linux")]
fn setup_rootfs() -> Result<()> {
    minidocker_core::filesystem::mount::make_propagation_private()?;

    let new_root = std::env::current_dir().map_err(|e| MinidockerError::Io {
        path: ".".into(),
        source: e,
    })?;
    minidocker_core::filesystem::pivot_root::pivot_root(&new_root)?;

    minidocker_core::filesystem::mount::mount_pseudo_filesystems()
}

/// Reads the framed user command from the init pipe to EOF.
///
/// Blocks until the parent closes the write end, i.e. until cgroup
/// limits are in place.
#[cfg(target_os = "linux")]
fn read_init_command() -> Result<Vec<String>> {
    use std::io::Read;
    use std::os::fd::FromRawFd;

    use minidocker_common::constants::INIT_PIPE_FD;

    // SAFETY: the launcher dup2'd the pipe read end onto FD 3 before
    // exec, and nothing else in this process owns that descriptor.
    let mut pipe = unsafe { std::fs::File::from_raw_fd(INIT_PIPE_FD) };
    let mut payload = Vec::new();
    pipe.read_to_end(&mut payload)
        .map_err(|e| MinidockerError::Syscall {
            message: format!("reading init pipe failed: {e}"),
        })?;

    let args = crate::pipe::decode_args(&payload);
    tracing::debug!(args = ?args, "init command received");
    Ok(args)
}

/// Resolves the command name the way `execvp` would: names containing a
/// slash are taken as paths, anything else is searched on `PATH`.
fn resolve_executable(name: &str) -> Result<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        if is_executable(&path) {
            return Ok(path);
        }
        return Err(MinidockerError::NotFound {
            kind: "executable",
            id: name.to_string(),
        });
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let dirs: Vec<PathBuf> = std::env::split_paths(&path_var).collect();
    search_path(name, &dirs).ok_or(MinidockerError::NotFound {
        kind: "executable",
        id: name.to_string(),
    })
}

fn search_path(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Replaces the process image with the user command, argv[0] included,
/// keeping the inherited environment.
#[cfg(target_os = "linux")]
fn exec_user_command(executable: &Path, args: &[String]) -> Result<std::convert::Infallible> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let exe = CString::new(executable.as_os_str().as_bytes()).map_err(|_| {
        MinidockerError::Config {
            message: format!("executable path contains NUL: {}", executable.display()),
        }
    })?;
    let argv = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| MinidockerError::Config {
            message: "command argument contains NUL".into(),
        })?;

    match nix::unistd::execv(&exe, &argv) {
        Ok(infallible) => Ok(infallible),
        Err(e) => Err(MinidockerError::Syscall {
            message: format!("exec of {} failed: {e}", executable.display()),
        }),
    }
}
