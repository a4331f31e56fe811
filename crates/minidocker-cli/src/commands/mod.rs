//! CLI command definitions and dispatch.

pub mod init;
pub mod run;

use clap::{Parser, Subcommand};

/// minidocker — a simple container runtime.
#[derive(Parser, Debug)]
#[command(name = minidocker_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create and run a container with namespace and cgroup limits.
    Run(run::RunArgs),
    /// Internal init entry point; the runtime re-executes itself with
    /// this subcommand inside the container's namespaces.
    #[command(hide = true)]
    Init,
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => run::execute(args),
        Command::Init => init::execute(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn run_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "minidocker",
            "run",
            "--it",
            "--mem",
            "100m",
            "--cpu",
            "50000",
            "--cpuset",
            "0-2",
            "/bin/sh",
        ])
        .expect("parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert!(args.it);
        assert_eq!(args.mem.as_deref(), Some("100m"));
        assert_eq!(args.cpu.as_deref(), Some("50000"));
        assert_eq!(args.cpuset.as_deref(), Some("0-2"));
        assert_eq!(args.command, vec!["/bin/sh"]);
    }

    #[test]
    fn trailing_command_keeps_its_own_flags() {
        let cli = Cli::try_parse_from([
            "minidocker",
            "run",
            "--it",
            "/bin/sh",
            "-c",
            "echo hi",
        ])
        .expect("parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.command, vec!["/bin/sh", "-c", "echo hi"]);
    }

    #[test]
    fn volume_and_root_are_parsed() {
        let cli = Cli::try_parse_from([
            "minidocker",
            "run",
            "-v",
            "/tmp/foo:/data",
            "--root",
            "/srv/minidocker",
            "/bin/true",
        ])
        .expect("parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.volume.as_deref(), Some("/tmp/foo:/data"));
        assert_eq!(args.root, std::path::PathBuf::from("/srv/minidocker"));
    }

    #[test]
    fn init_subcommand_parses_bare() {
        let cli = Cli::try_parse_from(["minidocker", "init"]).expect("parse");
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn run_without_command_parses_and_defers_validation() {
        // The missing-command diagnostic comes from the runtime so it
        // fires before any side effect, with the documented message.
        let cli = Cli::try_parse_from(["minidocker", "run"]).expect("parse");
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert!(args.command.is_empty());
    }
}
