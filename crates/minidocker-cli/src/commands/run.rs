//! `minidocker run` — launch a command in an isolated container.

use std::path::PathBuf;

use clap::Args;
use minidocker_common::constants::DEFAULT_ROOT_DIR;
use minidocker_common::types::ResourceConfig;
use minidocker_runtime::container::{run_container, LaunchConfig};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Attach the terminal to the container (stdin/stdout/stderr).
    #[arg(long)]
    pub it: bool,

    /// Hard memory limit (memory.max), e.g. 100m or max.
    #[arg(long)]
    pub mem: Option<String>,

    /// Guaranteed minimum memory (memory.min).
    #[arg(long)]
    pub mem_min: Option<String>,

    /// Best-effort memory protection (memory.low).
    #[arg(long)]
    pub mem_low: Option<String>,

    /// Memory throttling threshold (memory.high).
    #[arg(long)]
    pub mem_high: Option<String>,

    /// Swap limit (memory.swap.max), e.g. 100m or max.
    #[arg(long)]
    pub mem_swap_max: Option<String>,

    /// CPU quota in microseconds per 100ms period (cpu.max).
    #[arg(long)]
    pub cpu: Option<String>,

    /// Relative CPU weight, 1-10000 (cpu.weight).
    #[arg(long)]
    pub cpu_weight: Option<String>,

    /// CPU weight as a nice value, -20..19 (cpu.weight.nice).
    #[arg(long, allow_hyphen_values = true)]
    pub cpu_weight_nice: Option<String>,

    /// CPU affinity list (cpuset.cpus), e.g. 0-2 or 0,1.
    #[arg(long)]
    pub cpuset: Option<String>,

    /// Bind a host directory into the container, host:container.
    #[arg(short = 'v', long = "volume")]
    pub volume: Option<String>,

    /// Workspace root containing busybox.tar.
    #[arg(long, default_value = DEFAULT_ROOT_DIR)]
    pub root: PathBuf,

    /// Command to run inside the container.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    fn resources(&self) -> ResourceConfig {
        ResourceConfig {
            memory_max: self.mem.clone(),
            memory_min: self.mem_min.clone(),
            memory_low: self.mem_low.clone(),
            memory_high: self.mem_high.clone(),
            memory_swap_max: self.mem_swap_max.clone(),
            cpu_max: self.cpu.clone(),
            cpu_weight: self.cpu_weight.clone(),
            cpu_weight_nice: self.cpu_weight_nice.clone(),
            cpuset: self.cpuset.clone(),
        }
    }
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error when the launch itself fails; a container that ran
/// and exited nonzero terminates this process with the same code.
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = LaunchConfig {
        resources: args.resources(),
        command: args.command,
        root_dir: args.root,
        volume: args.volume,
        tty: args.it,
    };

    let exit_code = run_container(&config).map_err(|e| anyhow::anyhow!("{e}"))?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
