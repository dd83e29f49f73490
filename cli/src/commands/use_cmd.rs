//! `venvman use` — set the project's active virtual environment.

use anyhow::Result;
use clap::Args;
use venvman_core::Project;

use crate::output::OutputContext;

#[derive(Args)]
pub struct UseArgs {
    /// Runtime alias: a partial quintuplet or an interpreter path
    pub alias: String,
}

/// Run `venvman use`.
///
/// # Errors
///
/// Fails when the alias does not resolve to exactly one runtime, or the
/// marker cannot be written.
pub fn run(ctx: &OutputContext, project: &Project, args: &UseArgs) -> Result<i32> {
    let runtime = project.find_runtime(&args.alias)?;
    project.activate(&runtime)?;
    ctx.success(&format!("Activated {}", runtime.name()));
    Ok(0)
}
