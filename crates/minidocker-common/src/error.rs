//! Unified error types for the minidocker workspace.
//!
//! Library crates return [`MinidockerError`] everywhere; the CLI binary
//! wraps it in `anyhow` at the top level.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MinidockerError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value or launch request is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Extraction of a base image archive failed.
    #[error("failed to extract {archive}: {detail}")]
    Extract {
        /// Archive that could not be unpacked.
        archive: PathBuf,
        /// Combined diagnostic output of the extraction.
        detail: String,
    },

    /// A kernel syscall (mount, clone, pivot_root, exec, ...) failed.
    #[error("syscall failed: {message}")]
    Syscall {
        /// Description of the failed operation.
        message: String,
    },

    /// A cgroup v2 operation failed.
    #[error("cgroup error: {message}")]
    Cgroup {
        /// Description of the failed cgroup operation.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MinidockerError>;
