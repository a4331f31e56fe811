//! # minidocker-common
//!
//! Shared error definitions, the resource-limit configuration record,
//! and workspace-wide constants for the minidocker runtime.
//!
//! This crate is the leaf of the dependency graph — it depends on no
//! other internal crate and provides the foundational primitives that
//! all other crates build upon.

pub mod constants;
pub mod error;
pub mod types;
