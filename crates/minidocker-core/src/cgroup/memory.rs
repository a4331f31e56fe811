//! Memory resource control via cgroups v2.
//!
//! Writes `memory.max`, `memory.min`, `memory.low`, `memory.high`, and
//! `memory.swap.max` for a cgroup.

use std::path::Path;

use minidocker_common::error::Result;
use minidocker_common::types::ResourceConfig;

use super::controller::{ensure_cgroup_dir, write_interface_file, Controller};

/// Controller for the `memory.*` interface files.
#[derive(Debug, Default)]
pub struct MemoryController;

impl Controller for MemoryController {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn set(&self, path: &Path, res: &ResourceConfig) -> Result<()> {
        ensure_cgroup_dir(path)?;

        if let Some(max) = &res.memory_max {
            write_interface_file(path, "memory.max", max)?;
        }
        if let Some(min) = &res.memory_min {
            write_interface_file(path, "memory.min", min)?;
        }
        if let Some(low) = &res.memory_low {
            write_interface_file(path, "memory.low", low)?;
        }
        if let Some(high) = &res.memory_high {
            write_interface_file(path, "memory.high", high)?;
        }
        if let Some(swap_max) = &res.memory_swap_max {
            write_interface_file(path, "memory.swap.max", swap_max)?;
        }
        Ok(())
    }
}
