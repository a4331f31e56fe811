//! Container launch path for the minidocker runtime.
//!
//! The runtime is one binary in two roles. The parent ([`process`],
//! [`container`]) builds the workspace, clones the child into fresh
//! namespaces, configures the cgroup, and hands the user command over
//! a pipe. The child ([`init`]) re-enters the same binary through the
//! `init` subcommand, finishes the mount bootstrap inside the new
//! namespaces, and execs the command it reads from the pipe.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod init;
pub mod pipe;
pub mod process;
