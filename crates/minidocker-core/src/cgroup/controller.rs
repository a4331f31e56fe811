//! The controller capability set and the shared interface-file writer.

use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use minidocker_common::error::{MinidockerError, Result};
use minidocker_common::types::ResourceConfig;

/// A per-resource translator from [`ResourceConfig`] fields to cgroup v2
/// interface-file writes.
///
/// Controllers never read values back and never validate ranges; the
/// kernel is the source of truth and rejects bad values at write time.
pub trait Controller: Send {
    /// Short controller name used in logs.
    fn name(&self) -> &'static str;

    /// Writes every field of `res` governed by this controller into the
    /// cgroup directory at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error naming the interface file on the first failed
    /// write; later files are not attempted.
    fn set(&self, path: &Path, res: &ResourceConfig) -> Result<()>;
}

/// Ensures the cgroup directory exists with mode 0755.
pub(crate) fn ensure_cgroup_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(path)
        .map_err(|e| MinidockerError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Writes `value` plus a trailing newline into the interface file
/// `name` under `dir`.
///
/// The file is opened write-only without truncation; cgroup interface
/// files already exist and are consumed by the kernel line-wise.
pub(crate) fn write_interface_file(dir: &Path, name: &str, value: &str) -> Result<()> {
    let path = dir.join(name);
    let mut file = OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(|e| MinidockerError::Io {
            path: path.clone(),
            source: e,
        })?;
    file.write_all(format!("{value}\n").as_bytes())
        .map_err(|e| MinidockerError::Io {
            path: path.clone(),
            source: e,
        })?;
    tracing::debug!(file = %path.display(), value, "interface file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_appends_single_trailing_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("memory.max"), "").expect("create");

        write_interface_file(dir.path(), "memory.max", "100m").expect("write");
        let content = std::fs::read_to_string(dir.path().join("memory.max")).expect("read");
        assert_eq!(content, "100m\n");
    }

    #[test]
    fn write_missing_file_error_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_interface_file(dir.path(), "cpu.weight", "500").unwrap_err();
        assert!(format!("{err}").contains("cpu.weight"));
    }

    #[test]
    fn write_does_not_truncate() {
        // Interface files are consumed by the kernel, not stored; on a
        // plain filesystem the old tail survives a shorter write, which
        // is exactly what open-without-truncate means.
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("cpu.max"), "primordial").expect("create");

        write_interface_file(dir.path(), "cpu.max", "max").expect("write");
        let content = std::fs::read_to_string(dir.path().join("cpu.max")).expect("read");
        assert!(content.starts_with("max\n"));
    }

    #[test]
    fn ensure_dir_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("minidocker-cgroup");
        ensure_cgroup_dir(&target).expect("create");
        assert!(target.is_dir());
        ensure_cgroup_dir(&target).expect("idempotent");
    }
}
