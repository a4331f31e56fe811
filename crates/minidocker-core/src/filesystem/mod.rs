//! Filesystem management for container isolation.
//!
//! Provides the overlay workspace builder, host-path bind volumes,
//! `pivot_root` for root filesystem switching, and the mount plumbing
//! used by the init bootstrap.

pub mod mount;
pub mod overlayfs;
pub mod pivot_root;
pub mod volume;

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use minidocker_common::error::{MinidockerError, Result};

/// Creates `path` with the given mode; errors if it already exists.
pub(crate) fn make_dir(path: &Path, mode: u32) -> Result<()> {
    DirBuilder::new()
        .mode(mode)
        .create(path)
        .map_err(|e| MinidockerError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Creates `path` and any missing parents with the given mode.
pub(crate) fn make_dir_all(path: &Path, mode: u32) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| MinidockerError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_dir_fails_on_existing_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("once");
        make_dir(&target, 0o777).expect("first");
        assert!(make_dir(&target, 0o777).is_err());
    }

    #[test]
    fn make_dir_all_tolerates_existing_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("a/b/c");
        make_dir_all(&target, 0o777).expect("first");
        make_dir_all(&target, 0o777).expect("second");
        assert!(target.is_dir());
    }
}
