//! `venvman remove` — delete a virtual environment.

use anyhow::Result;
use clap::Args;
use venvman_core::Project;

use crate::output::OutputContext;

#[derive(Args)]
pub struct RemoveArgs {
    /// Runtime alias: a partial quintuplet or an interpreter path
    pub alias: String,
}

/// Run `venvman remove`.
///
/// A currently active runtime is deactivated before its directory is
/// deleted.
///
/// # Errors
///
/// Fails when the alias does not resolve to exactly one runtime, or the
/// directory cannot be removed.
pub fn run(ctx: &OutputContext, project: &Project, args: &RemoveArgs) -> Result<i32> {
    let runtime = project.find_runtime(&args.alias)?;
    project.remove_runtime(&runtime)?;
    ctx.success(&format!("Removed {}", runtime.name()));
    Ok(0)
}
