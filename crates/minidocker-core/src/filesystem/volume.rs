//! Host-path bind volumes.
//!
//! A volume is specified as `host:container`; the host directory is
//! bind-mounted over the container path inside the merged root. The
//! bind must be released before the overlay itself is unmounted.

use std::path::{Path, PathBuf};

use minidocker_common::error::{MinidockerError, Result};

/// Splits a `host:container` volume specification.
///
/// # Errors
///
/// Returns a `Config` error when the separator count is wrong or either
/// side is empty; the message references the offending spec.
pub fn parse_spec(spec: &str) -> Result<(PathBuf, PathBuf)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 2 {
        return Err(MinidockerError::Config {
            message: format!("invalid volume [{spec}], must be host:container"),
        });
    }
    if parts[0].is_empty() || parts[1].is_empty() {
        return Err(MinidockerError::Config {
            message: format!("invalid volume [{spec}], paths can't be empty"),
        });
    }
    Ok((PathBuf::from(parts[0]), PathBuf::from(parts[1])))
}

/// Resolves the in-container volume path to its location on the host
/// below the merged root.
fn container_target(merged: &Path, container: &Path) -> PathBuf {
    // `container` is absolute inside the container; joining it verbatim
    // would discard `merged`.
    match container.strip_prefix("/") {
        Ok(relative) => merged.join(relative),
        Err(_) => merged.join(container),
    }
}

/// Bind-mounts `host` onto `container` below the merged root.
///
/// Both directories are created (recursively, mode 0777) when missing.
///
/// # Errors
///
/// Returns an error if directory creation or the bind mount fails.
#[cfg(target_os = "linux")]
pub fn mount_volume(merged: &Path, host: &Path, container: &Path) -> Result<()> {
    use nix::mount::{mount, MsFlags};

    super::make_dir_all(host, 0o777)?;
    let target = container_target(merged, container);
    super::make_dir_all(&target, 0o777)?;

    mount(
        Some(host),
        &target,
        None::<&str>,
        MsFlags::MS_BIND,
        None::<&str>,
    )
    .map_err(|e| MinidockerError::Syscall {
        message: format!("bind mount of {} failed: {e}", host.display()),
    })?;

    tracing::info!(host = %host.display(), target = %target.display(), "volume mounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — bind mounts require Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_volume(_merged: &Path, _host: &Path, _container: &Path) -> Result<()> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Unmounts the bind volume below the merged root. Best-effort: the
/// outcome is logged, never propagated.
#[cfg(target_os = "linux")]
pub fn unmount_volume(merged: &Path, container: &Path) {
    let target = container_target(merged, container);
    match nix::mount::umount(&target) {
        Ok(()) => tracing::debug!(target = %target.display(), "volume unmounted"),
        Err(e) => {
            tracing::warn!(target = %target.display(), error = %e, "volume unmount failed");
        }
    }
}

/// Stub for non-Linux platforms.
#[cfg(not(target_os = "linux"))]
pub fn unmount_volume(_merged: &Path, _container: &Path) {}
