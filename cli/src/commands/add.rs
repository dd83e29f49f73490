//! `venvman add` — create a virtual environment from a base interpreter.

use anyhow::Result;
use clap::Args;
use venvman_core::{Project, VenvCommandBuilder};

use crate::output::OutputContext;

#[derive(Args)]
pub struct AddArgs {
    /// Base interpreter: a version (3.11), an executable name, or a path
    pub python: String,
}

/// Run `venvman add`.
///
/// # Errors
///
/// Fails when the interpreter cannot be resolved, the runtime already
/// exists, or the environment builder fails.
pub fn run(ctx: &OutputContext, project: &Project, args: &AddArgs) -> Result<i32> {
    let spinner = ctx.spinner(&format!("Creating environment for {}", args.python));
    let created = project.create_runtime(&args.python, &VenvCommandBuilder);
    spinner.finish_and_clear();

    let runtime = created?;
    ctx.success(&format!("Created {}", runtime.name()));
    Ok(0)
}
