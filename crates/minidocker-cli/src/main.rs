//! # minidocker — minimal container runtime CLI
//!
//! Single binary in two roles: `run` launches a command inside an
//! isolated container; `init` is the internal re-exec entry point that
//! becomes the container's PID 1.

#![allow(clippy::print_stderr)]

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
