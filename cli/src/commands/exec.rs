//! Launching a command inside the selected runtime.

use anyhow::Result;
use venvman_core::{Error, Launcher, Project, Runtime};

/// Pick the runtime for a launch: an explicit `--spec` alias wins,
/// otherwise the active runtime.
fn select_runtime(project: &Project, spec: Option<&str>) -> Result<Runtime, Error> {
    match spec {
        Some(alias) => project.find_runtime(alias),
        None => project.active_runtime()?.ok_or(Error::NoActiveRuntime),
    }
}

/// Run `venvman <command> [args…]`.
///
/// Relays the child's own exit status unmodified. On POSIX the child
/// replaces this process entirely, so this returns only on failure.
///
/// # Errors
///
/// Runtime selection failures, [`Error::CommandNotFound`], or the spawn
/// error itself.
pub fn run(project: &Project, spec: Option<&str>, argv: &[String]) -> Result<i32> {
    let Some((command, args)) = argv.split_first() else {
        anyhow::bail!("no command given");
    };
    let runtime = select_runtime(project, spec)?;
    let launcher = Launcher::new(&runtime, command.clone(), args.to_vec());
    let status = launcher.run()?;
    Ok(status.code().unwrap_or(1))
}
