//! System-wide constants and default paths.

/// Default workspace root holding the base image and overlay layers.
pub const DEFAULT_ROOT_DIR: &str = "/var/lib/minidocker";

/// Name of the cgroup created for a container run.
pub const CGROUP_NAME: &str = "minidocker-cgroup";

/// Base image tarball expected inside the workspace root.
pub const BASE_IMAGE_TAR: &str = "busybox.tar";

/// Read-only lower layer directory, extracted from the base tarball.
pub const LOWER_DIR: &str = "busybox";

/// Writable overlay upper layer directory, recreated per run.
pub const UPPER_DIR: &str = "upper";

/// Overlay work directory, recreated per run.
pub const WORK_DIR: &str = "work";

/// Overlay mount point presenting the merged root filesystem.
pub const MERGED_DIR: &str = "merged";

/// Directory inside the new root that briefly holds the old root
/// during `pivot_root`.
pub const OLD_ROOT_DIR: &str = ".pivot_root";

/// File descriptor carrying the init command into the container.
/// It is the first descriptor after stdio, so it is always 3.
pub const INIT_PIPE_FD: i32 = 3;

/// Application name used in logs and the cgroup hierarchy.
pub const APP_NAME: &str = "minidocker";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "minidocker";
