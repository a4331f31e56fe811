//! `minidocker init` — internal container init entry point.
//!
//! Never invoked by a user; the launcher re-executes the binary with
//! this subcommand inside the freshly cloned namespaces.

/// Executes the init bootstrap. On success control never returns here:
/// the process image is replaced by the user command.
///
/// # Errors
///
/// Returns an error if the bootstrap fails; the container exits.
pub fn execute() -> anyhow::Result<()> {
    match minidocker_runtime::init::init_container() {
        Ok(never) => match never {},
        Err(e) => Err(anyhow::anyhow!("{e}")),
    }
}
