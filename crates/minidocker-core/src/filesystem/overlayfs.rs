//! Overlay workspace assembly for the container root filesystem.
//!
//! The workspace root holds a base image tarball and four managed
//! directories: a read-only lower layer extracted once and reused
//! across runs, a per-run upper/work pair, and the merged overlay
//! mount point the container pivots into.

use std::path::{Path, PathBuf};
use std::process::Command;

use minidocker_common::constants::{BASE_IMAGE_TAR, LOWER_DIR, MERGED_DIR, UPPER_DIR, WORK_DIR};
use minidocker_common::error::{MinidockerError, Result};

use super::volume;

/// Builds the overlay workspace under `root` and returns the merged
/// mount point, which becomes the container's root filesystem.
///
/// Steps, in order: ensure the lower layer (extracting the base
/// tarball on first use), create the upper and work directories, mount
/// the overlay on `merged`, then attach the optional bind volume.
///
/// # Errors
///
/// Returns an error on the first failing step; already-created
/// directories are not rolled back.
pub fn new_workspace(root: &Path, volume_spec: Option<&str>) -> Result<PathBuf> {
    let lower = ensure_lower(root)?;
    let (upper, work) = create_upper_work(root)?;
    let merged = mount_overlay(root, &lower, &upper, &work)?;

    if let Some(spec) = volume_spec {
        let (host, container) = volume::parse_spec(spec)?;
        volume::mount_volume(&merged, &host, &container)?;
    }
    Ok(merged)
}

/// Tears the workspace down in strict reverse order: volume bind,
/// overlay mount, then the merged/upper/work directories. The lower
/// layer is retained for the next run. Every step is best-effort and
/// logs its outcome.
pub fn delete_workspace(root: &Path, volume_spec: Option<&str>) {
    let merged = root.join(MERGED_DIR);

    if let Some(spec) = volume_spec {
        match volume::parse_spec(spec) {
            Ok((_, container)) => volume::unmount_volume(&merged, &container),
            Err(e) => tracing::warn!(spec, error = %e, "skipping volume unmount"),
        }
    }

    unmount_overlay(&merged);
    remove_dir_logged(&merged);
    remove_dir_logged(&root.join(UPPER_DIR));
    remove_dir_logged(&root.join(WORK_DIR));
}

/// Returns the lower layer directory, extracting the base image
/// tarball into it on first use.
fn ensure_lower(root: &Path) -> Result<PathBuf> {
    let lower = root.join(LOWER_DIR);
    if lower.is_dir() {
        tracing::debug!(path = %lower.display(), "reusing extracted base image");
        return Ok(lower);
    }

    let tarball = root.join(BASE_IMAGE_TAR);
    if !tarball.is_file() {
        return Err(MinidockerError::NotFound {
            kind: "base image tarball",
            id: tarball.display().to_string(),
        });
    }

    super::make_dir(&lower, 0o777)?;
    let output = Command::new("tar")
        .arg("-xf")
        .arg(&tarball)
        .arg("-C")
        .arg(&lower)
        .output()
        .map_err(|e| MinidockerError::Io {
            path: tarball.clone(),
            source: e,
        })?;
    if !output.status.success() {
        let mut detail = String::from_utf8_lossy(&output.stdout).into_owned();
        detail.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(MinidockerError::Extract {
            archive: tarball,
            detail: detail.trim().to_string(),
        });
    }

    tracing::info!(path = %lower.display(), "base image extracted");
    Ok(lower)
}

/// Creates the per-run upper and work directories.
///
/// Leftovers from an earlier run are an error; callers must start from
/// a clean workspace root.
fn create_upper_work(root: &Path) -> Result<(PathBuf, PathBuf)> {
    let upper = root.join(UPPER_DIR);
    super::make_dir(&upper, 0o777)?;
    let work = root.join(WORK_DIR);
    super::make_dir(&work, 0o777)?;
    tracing::debug!(upper = %upper.display(), work = %work.display(), "overlay layers created");
    Ok((upper, work))
}

/// Creates the merged directory and mounts the overlay onto it.
#[cfg(target_os = "linux")]
fn mount_overlay(root: &Path, lower: &Path, upper: &Path, work: &Path) -> Result<PathBuf> {
    use nix::mount::{mount, MsFlags};

    let merged = root.join(MERGED_DIR);
    super::make_dir(&merged, 0o777)?;

    let options = format!(
        "lowerdir={},upperdir={},workdir={}",
        lower.display(),
        upper.display(),
        work.display()
    );
    mount(
        Some("overlay"),
        &merged,
        Some("overlay"),
        MsFlags::empty(),
        Some(options.as_str()),
    )
    .map_err(|e| MinidockerError::Syscall {
        message: format!("overlay mount failed: {e}"),
    })?;

    tracing::info!(merged = %merged.display(), options = %options, "overlayfs mounted");
    Ok(merged)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — overlay mounting requires Linux.
#[cfg(not(target_os = "linux"))]
fn mount_overlay(_root: &Path, _lower: &Path, _upper: &Path, _work: &Path) -> Result<PathBuf> {
    Err(MinidockerError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Lazily detaches the overlay mount. Best-effort.
#[cfg(target_os = "linux")]
fn unmount_overlay(merged: &Path) {
    match nix::mount::umount2(merged, nix::mount::MntFlags::MNT_DETACH) {
        Ok(()) => tracing::debug!(path = %merged.display(), "overlayfs unmounted"),
        Err(e) => tracing::warn!(path = %merged.display(), error = %e, "overlay unmount failed"),
    }
}

#[cfg(not(target_os = "linux"))]
fn unmount_overlay(_merged: &Path) {}

fn remove_dir_logged(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "directory removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "directory removal failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_base_tarball(root: &Path) {
        let file = std::fs::File::create(root.join(BASE_IMAGE_TAR)).expect("create tar");
        let mut builder = tar::Builder::new(file);
        let data = b"#!/bin/sh\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "bin/sh", &data[..])
            .expect("append");
        builder.finish().expect("finish tar");
    }

    #[test]
    fn lower_is_extracted_from_the_base_tarball() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_base_tarball(tmp.path());

        let lower = ensure_lower(tmp.path()).expect("extract");
        assert_eq!(lower, tmp.path().join(LOWER_DIR));
        assert!(lower.join("bin/sh").is_file());
    }

    #[test]
    fn existing_lower_is_reused_without_tarball() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let lower = tmp.path().join(LOWER_DIR);
        std::fs::create_dir(&lower).expect("lower");
        std::fs::write(lower.join("marker"), "kept").expect("marker");

        let reused = ensure_lower(tmp.path()).expect("reuse");
        assert_eq!(reused, lower);
        assert_eq!(
            std::fs::read_to_string(lower.join("marker")).expect("read"),
            "kept"
        );
    }

    #[test]
    fn missing_tarball_is_reported_before_any_layer_exists() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = new_workspace(tmp.path(), None).unwrap_err();
        assert!(matches!(err, MinidockerError::NotFound { .. }));
        // The lower step failed first, so no per-run layer leaked.
        assert!(!tmp.path().join(UPPER_DIR).exists());
        assert!(!tmp.path().join(WORK_DIR).exists());
        assert!(!tmp.path().join(MERGED_DIR).exists());
    }

    #[test]
    fn stale_upper_from_a_previous_run_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join(UPPER_DIR)).expect("stale upper");
        assert!(create_upper_work(tmp.path()).is_err());
    }

    #[test]
    fn corrupt_tarball_surfaces_extraction_diagnostics() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join(BASE_IMAGE_TAR), b"not a tar archive").expect("write");

        let err = ensure_lower(tmp.path()).unwrap_err();
        assert!(matches!(err, MinidockerError::Extract { .. }));
    }

    #[test]
    fn delete_workspace_removes_per_run_layers_and_keeps_lower() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let lower = tmp.path().join(LOWER_DIR);
        std::fs::create_dir(&lower).expect("lower");
        std::fs::create_dir(tmp.path().join(UPPER_DIR)).expect("upper");
        std::fs::create_dir(tmp.path().join(WORK_DIR)).expect("work");
        std::fs::create_dir(tmp.path().join(MERGED_DIR)).expect("merged");

        delete_workspace(tmp.path(), None);

        assert!(!tmp.path().join(UPPER_DIR).exists());
        assert!(!tmp.path().join(WORK_DIR).exists());
        assert!(!tmp.path().join(MERGED_DIR).exists());
        assert!(lower.is_dir());
    }
}
