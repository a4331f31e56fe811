//! Mount plumbing for the container mount namespace.
//!
//! Covers the propagation fix that must precede any bind mount and the
//! canonical pseudo-filesystems remounted after `pivot_root`.

use minidocker_common::error::{MinidockerError, Result};

/// Recursively marks `/` private so mounts made in the container's
/// namespace never propagate back to the host.
///
/// # Errors
///
/// Returns an error if the `mount(2)` call fails; the init bootstrap
/// treats this as fatal.
#[cfg(target_os = "linux")]
pub fn make_propagation_private() -> Result<()> {
    use nix::mount::{mount, MsFlags};

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| MinidockerError::Syscall {
        message: format!("failed to make mount propagation private: {e}"),
    })?;
    tracing::debug!("mount propagation set to private");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — mount propagation control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_propagation_private() -> Result<()> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Mounts the canonical pseudo-filesystems inside the pivoted root:
/// `/proc`, `/sys`, `/tmp`, `/dev`, `/dev/pts`, and `/dev/shm`.
///
/// Mount targets missing from a minimal base image are created first.
///
/// # Errors
///
/// Returns an error naming the target of the first failing mount.
#[cfg(target_os = "linux")]
pub fn mount_pseudo_filesystems() -> Result<()> {
    use nix::mount::{mount, MsFlags};

    let default_flags = MsFlags::MS_NOEXEC | MsFlags::MS_NOSUID | MsFlags::MS_NODEV;
    let mounts: [(&str, &str, &str, MsFlags, Option<&str>); 6] = [
        ("proc", "/proc", "proc", default_flags, None),
        ("sysfs", "/sys", "sysfs", default_flags, None),
        (
            "tmpfs",
            "/tmp",
            "tmpfs",
            MsFlags::MS_NOSUID | MsFlags::MS_NODEV,
            None,
        ),
        (
            "devtmpfs",
            "/dev",
            "devtmpfs",
            MsFlags::MS_NOSUID | MsFlags::MS_STRICTATIME,
            Some("mode=755"),
        ),
        (
            "devpts",
            "/dev/pts",
            "devpts",
            MsFlags::MS_NOSUID | MsFlags::MS_NOEXEC,
            Some("gid=5,mode=620"),
        ),
        (
            "tmpfs",
            "/dev/shm",
            "tmpfs",
            MsFlags::MS_NOSUID | MsFlags::MS_NODEV,
            Some("mode=1777"),
        ),
    ];

    for (source, target, fstype, flags, data) in mounts {
        std::fs::create_dir_all(target).map_err(|e| MinidockerError::Io {
            path: target.into(),
            source: e,
        })?;
        mount(Some(source), target, Some(fstype), flags, data).map_err(|e| {
            MinidockerError::Syscall {
                message: format!("failed to mount {target}: {e}"),
            }
        })?;
        tracing::debug!(target, fstype, "pseudo-filesystem mounted");
    }
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — these mounts require Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_pseudo_filesystems() -> Result<()> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}
