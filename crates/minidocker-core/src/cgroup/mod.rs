//! Cgroups v2 resource management.
//!
//! Provides the process-wide [`CgroupManager`] that discovers the
//! unified hierarchy, creates named cgroups, attaches processes, and
//! delegates limit writes to the per-resource controllers.

pub mod controller;
pub mod cpu;
pub mod memory;

use std::collections::HashSet;
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use minidocker_common::error::{MinidockerError, Result};
use minidocker_common::types::ResourceConfig;

use self::controller::Controller;
use self::cpu::CpuController;
use self::memory::MemoryController;

/// Mount point position in a `/proc/self/mountinfo` record.
const MOUNT_POINT_INDEX: usize = 4;

/// Manager for cgroups under the discovered cgroup v2 root.
///
/// A name is tracked iff its directory was created through this manager
/// and not yet destroyed. Controllers run in fixed order: memory first,
/// then CPU.
pub struct CgroupManager {
    root: PathBuf,
    cgroups: HashSet<String>,
    controllers: Vec<Box<dyn Controller>>,
}

static MANAGER: OnceLock<std::result::Result<Mutex<CgroupManager>, String>> = OnceLock::new();

/// Returns the process-wide manager, initializing it on first call.
///
/// Initialization discovers the cgroup v2 mount point from
/// `/proc/self/mountinfo`. A failed initialization is sticky: every
/// subsequent call reports the same error without retrying.
///
/// # Errors
///
/// Returns a `Cgroup` error when the hierarchy could not be located.
pub fn acquire() -> Result<&'static Mutex<CgroupManager>> {
    let slot = MANAGER.get_or_init(|| match find_cgroup2_mountpoint() {
        Ok(root) => {
            tracing::info!(root = %root.display(), "cgroup manager initialized");
            Ok(Mutex::new(CgroupManager::with_root(root)))
        }
        Err(e) => {
            tracing::error!(error = %e, "cgroup manager initialization failed");
            Err(e.to_string())
        }
    });
    match slot {
        Ok(manager) => Ok(manager),
        Err(message) => Err(MinidockerError::Cgroup {
            message: message.clone(),
        }),
    }
}

impl CgroupManager {
    /// Creates a manager rooted at an explicit hierarchy path.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            cgroups: HashSet::new(),
            controllers: vec![Box::new(MemoryController), Box::new(CpuController)],
        }
    }

    /// Path of the managed cgroup v2 hierarchy root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates and tracks the cgroup `name` under the root.
    ///
    /// Calling this for an already-tracked name is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns an error if the cgroup directory cannot be created.
    pub fn create_cgroup(&mut self, name: &str) -> Result<()> {
        if self.cgroups.contains(name) {
            tracing::debug!(name, "cgroup already tracked");
            return Ok(());
        }
        let path = self.root.join(name);
        DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(&path)
            .map_err(|e| MinidockerError::Io {
                path: path.clone(),
                source: e,
            })?;
        self.cgroups.insert(name.to_string());
        tracing::info!(path = %path.display(), "cgroup created");
        Ok(())
    }

    /// Moves `pid` into the tracked cgroup `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an untracked name, or an `Io` error if
    /// writing `cgroup.procs` fails.
    pub fn apply(&self, name: &str, pid: i32) -> Result<()> {
        self.require_tracked(name)?;
        let procs = self.root.join(name).join("cgroup.procs");
        std::fs::write(&procs, pid.to_string()).map_err(|e| MinidockerError::Io {
            path: procs,
            source: e,
        })?;
        tracing::debug!(name, pid, "process attached to cgroup");
        Ok(())
    }

    /// Applies `res` to the tracked cgroup `name` through every
    /// controller in fixed order; the first failure aborts the rest.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an untracked name, or the failing
    /// controller's error.
    pub fn set(&self, name: &str, res: &ResourceConfig) -> Result<()> {
        self.require_tracked(name)?;
        let path = self.root.join(name);
        for ctrl in &self.controllers {
            tracing::debug!(name, controller = ctrl.name(), "applying limits");
            ctrl.set(&path, res)?;
        }
        Ok(())
    }

    /// Removes the cgroup `name` and stops tracking it.
    ///
    /// Destroying an untracked name is a no-op success. On removal
    /// failure the name stays tracked so a later destroy can retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cgroup directory cannot be removed.
    pub fn destroy(&mut self, name: &str) -> Result<()> {
        if !self.cgroups.contains(name) {
            tracing::debug!(name, "cgroup not tracked, nothing to destroy");
            return Ok(());
        }
        let path = self.root.join(name);
        std::fs::remove_dir_all(&path).map_err(|e| MinidockerError::Io {
            path: path.clone(),
            source: e,
        })?;
        self.cgroups.remove(name);
        tracing::info!(path = %path.display(), "cgroup destroyed");
        Ok(())
    }

    fn require_tracked(&self, name: &str) -> Result<()> {
        if self.cgroups.contains(name) {
            Ok(())
        } else {
            Err(MinidockerError::NotFound {
                kind: "cgroup",
                id: name.to_string(),
            })
        }
    }
}

/// Locates the cgroup v2 unified hierarchy of the current process.
fn find_cgroup2_mountpoint() -> Result<PathBuf> {
    let path = Path::new("/proc/self/mountinfo");
    let mountinfo = std::fs::read_to_string(path).map_err(|e| MinidockerError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_cgroup2_mountpoint(&mountinfo).ok_or(MinidockerError::NotFound {
        kind: "cgroup2 mountpoint",
        id: "/proc/self/mountinfo".into(),
    })
}

/// Scans mountinfo records for the one whose filesystem type is
/// `cgroup2` and returns its mount point field.
fn parse_cgroup2_mountpoint(mountinfo: &str) -> Option<PathBuf> {
    for line in mountinfo.lines() {
        let fields: Vec<&str> = line.split(' ').collect();
        // The filesystem type is the first field after the optional
        // fields terminator "-".
        let Some(sep) = fields.iter().position(|f| *f == "-") else {
            continue;
        };
        if fields.get(sep + 1).copied() == Some("cgroup2") {
            if let Some(mount_point) = fields.get(MOUNT_POINT_INDEX) {
                return Some(PathBuf::from(mount_point));
            }
        }
    }
    None
}
