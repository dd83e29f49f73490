//! `venvman list` — list virtual environments in the project.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use venvman_core::Project;

use crate::output::OutputContext;

#[derive(Serialize)]
struct RuntimeRow<'a> {
    name: String,
    root: &'a Path,
    active: bool,
}

/// Run `venvman list`.
///
/// The active runtime, if any, is starred (or flagged in JSON output).
///
/// # Errors
///
/// Fails when the container or the marker cannot be read.
pub fn run(ctx: &OutputContext, project: &Project, json: bool) -> Result<i32> {
    let runtimes = project.runtimes()?;
    let active = project.active_runtime()?;

    if json {
        let rows: Vec<RuntimeRow<'_>> = runtimes
            .iter()
            .map(|runtime| RuntimeRow {
                name: runtime.name().into_owned(),
                root: runtime.root(),
                active: Some(runtime) == active.as_ref(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(0);
    }

    ctx.header("Quintuplet");
    for runtime in &runtimes {
        let star = if Some(runtime) == active.as_ref() { "*" } else { " " };
        println!("{star} {}", runtime.name());
    }
    Ok(0)
}
