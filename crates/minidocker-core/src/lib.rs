//! # minidocker-core
//!
//! Low-level Linux isolation primitives for the minidocker runtime.
//!
//! This crate provides safe abstractions over:
//! - **Cgroups v2**: pluggable per-resource controllers and the
//!   process-wide cgroup manager.
//! - **Filesystem**: overlay workspace assembly, bind volumes,
//!   `pivot_root`, and the canonical pseudo-filesystem mounts.
//! - **Namespaces**: selection of the namespaces a container is
//!   cloned into.
//!
//! Everything here executes in whichever process calls it; the
//! parent/child split of the launch path lives in `minidocker-runtime`.

pub mod cgroup;
pub mod filesystem;
pub mod namespace;
