//! CPU resource control via cgroups v2.
//!
//! Writes `cpu.max`, `cpu.weight`, `cpu.weight.nice`, and
//! `cpuset.cpus` for a cgroup.

use std::path::Path;

use minidocker_common::error::Result;
use minidocker_common::types::ResourceConfig;

use super::controller::{ensure_cgroup_dir, write_interface_file, Controller};

/// Bandwidth period in microseconds; the quota in `cpu.max` is always
/// expressed against this fixed 100ms window.
const CPU_PERIOD_US: &str = "100000";

/// Controller for the `cpu.*` and `cpuset.*` interface files.
#[derive(Debug, Default)]
pub struct CpuController;

impl Controller for CpuController {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn set(&self, path: &Path, res: &ResourceConfig) -> Result<()> {
        ensure_cgroup_dir(path)?;

        if let Some(quota) = &res.cpu_max {
            write_interface_file(path, "cpu.max", &format!("{quota} {CPU_PERIOD_US}"))?;
        }
        if let Some(weight) = &res.cpu_weight {
            write_interface_file(path, "cpu.weight", weight)?;
        }
        if let Some(nice) = &res.cpu_weight_nice {
            write_interface_file(path, "cpu.weight.nice", nice)?;
        }
        if let Some(cpus) = &res.cpuset {
            write_interface_file(path, "cpuset.cpus", cpus)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPU_FILES: [&str; 4] = ["cpu.max", "cpu.weight", "cpu.weight.nice", "cpuset.cpus"];

    fn scratch_cgroup() -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("test-cgroup");
        std::fs::create_dir(&path).expect("cgroup dir");
        for file in CPU_FILES {
            std::fs::write(path.join(file), "").expect("interface file");
        }
        (tmp, path)
    }

    #[test]
    fn quota_is_paired_with_the_fixed_period() {
        let (_tmp, path) = scratch_cgroup();
        let res = ResourceConfig {
            cpu_max: Some("50000".into()),
            ..ResourceConfig::default()
        };

        CpuController.set(&path, &res).expect("set");

        assert_eq!(
            std::fs::read_to_string(path.join("cpu.max")).expect("read"),
            "50000 100000\n"
        );
    }

    #[test]
    fn set_writes_weight_nice_and_cpuset() {
        let (_tmp, path) = scratch_cgroup();
        let res = ResourceConfig {
            cpu_weight: Some("500".into()),
            cpu_weight_nice: Some("-10".into()),
            cpuset: Some("0-2".into()),
            ..ResourceConfig::default()
        };

        CpuController.set(&path, &res).expect("set");

        assert_eq!(
            std::fs::read_to_string(path.join("cpu.weight")).expect("read"),
            "500\n"
        );
        assert_eq!(
            std::fs::read_to_string(path.join("cpu.weight.nice")).expect("read"),
            "-10\n"
        );
        assert_eq!(
            std::fs::read_to_string(path.join("cpuset.cpus")).expect("read"),
            "0-2\n"
        );
    }

    #[test]
    fn unset_fields_leave_files_untouched() {
        let (_tmp, path) = scratch_cgroup();
        for file in CPU_FILES {
            std::fs::write(path.join(file), "sentinel").expect("seed");
        }

        CpuController
            .set(&path, &ResourceConfig::default())
            .expect("set");

        for file in CPU_FILES {
            assert_eq!(
                std::fs::read_to_string(path.join(file)).expect("read"),
                "sentinel",
                "{file} must not be written"
            );
        }
    }

    #[test]
    fn failed_write_names_the_interface_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("no-files");
        let res = ResourceConfig {
            cpuset: Some("0,1".into()),
            ..ResourceConfig::default()
        };
        let err = CpuController.set(&path, &res).unwrap_err();
        assert!(format!("{err}").contains("cpuset.cpus"));
    }
}
