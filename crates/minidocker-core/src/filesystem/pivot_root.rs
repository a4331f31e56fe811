//! Root filesystem switching via `pivot_root(2)`.
//!
//! Stronger than `chroot` because it swaps the root mount itself; the
//! old root is detached afterwards, so nothing of the host filesystem
//! stays reachable from inside the container.

use std::path::Path;

use minidocker_common::constants::OLD_ROOT_DIR;
use minidocker_common::error::{MinidockerError, Result};

/// Switches the root filesystem of the calling process to `new_root`.
///
/// Performs the full pivot sequence:
/// 1. Bind-mount `new_root` onto itself; `pivot_root` requires the new
///    root to be a mount point distinct from the old root's.
/// 2. Create `new_root/.pivot_root` to hold the old root.
/// 3. Call `pivot_root(2)`.
/// 4. Change working directory to the new `/`.
/// 5. Lazily detach and remove `/.pivot_root`.
///
/// Callers must have already made mount propagation private; a shared
/// `/` would leak the pivot back onto the host.
///
/// # Errors
///
/// Returns an error if any mount, pivot, or cleanup step fails.
#[cfg(target_os = "linux")]
pub fn pivot_root(new_root: &Path) -> Result<()> {
    use nix::mount::{mount, umount2, MntFlags, MsFlags};

    mount(
        Some(new_root),
        new_root,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| MinidockerError::Syscall {
        message: format!("bind mount of new root failed: {e}"),
    })?;

    let put_old = new_root.join(OLD_ROOT_DIR);
    super::make_dir(&put_old, 0o777)?;

    nix::unistd::pivot_root(new_root, &put_old).map_err(|e| MinidockerError::Syscall {
        message: format!("pivot_root failed: {e}"),
    })?;

    std::env::set_current_dir("/").map_err(|e| MinidockerError::Io {
        path: "/".into(),
        source: e,
    })?;

    let old_root = Path::new("/").join(OLD_ROOT_DIR);
    umount2(&old_root, MntFlags::MNT_DETACH).map_err(|e| MinidockerError::Syscall {
        message: format!("unmount of old root failed: {e}"),
    })?;
    std::fs::remove_dir(&old_root).map_err(|e| MinidockerError::Io {
        path: old_root.clone(),
        source: e,
    })?;

    tracing::info!(root = %new_root.display(), "pivot_root complete");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `pivot_root` requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn pivot_root(_new_root: &Path) -> Result<()> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}
