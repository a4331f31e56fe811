//! Domain types shared across the minidocker workspace.

/// Cgroup v2 resource limits for a container.
///
/// Every field is optional and string-valued; the strings are written to
/// the controller interface files verbatim, so they follow the kernel's
/// own syntax (`"100m"`, `"max"`, `"0-2"`, ...). An unset field never
/// causes a write to its interface file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Hard memory limit (`memory.max`), bytes or `"max"`.
    pub memory_max: Option<String>,
    /// Guaranteed minimum memory (`memory.min`), bytes.
    pub memory_min: Option<String>,
    /// Best-effort memory protection (`memory.low`), bytes.
    pub memory_low: Option<String>,
    /// Throttling threshold (`memory.high`), bytes.
    pub memory_high: Option<String>,
    /// Swap limit (`memory.swap.max`), bytes or `"max"`.
    pub memory_swap_max: Option<String>,
    /// CPU bandwidth quota per 100ms period (`cpu.max`).
    pub cpu_max: Option<String>,
    /// Relative CPU weight, 1-10000 (`cpu.weight`).
    pub cpu_weight: Option<String>,
    /// CPU weight expressed as a nice value, -20..19 (`cpu.weight.nice`).
    pub cpu_weight_nice: Option<String>,
    /// CPU affinity list, e.g. `0-2` or `0,1` (`cpuset.cpus`).
    pub cpuset: Option<String>,
}

impl ResourceConfig {
    /// Returns `true` when no limit is set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory_max.is_none()
            && self.memory_min.is_none()
            && self.memory_low.is_none()
            && self.memory_high.is_none()
            && self.memory_swap_max.is_none()
            && self.cpu_max.is_none()
            && self.cpu_weight.is_none()
            && self.cpu_weight_nice.is_none()
            && self.cpuset.is_none()
    }
}
