//! `venvman show` — print the active virtual environment.

use anyhow::Result;
use venvman_core::{Error, Project};

/// Run `venvman show`.
///
/// # Errors
///
/// [`Error::NoActiveRuntime`] when no runtime is active.
pub fn run(project: &Project, json: bool) -> Result<i32> {
    let runtime = project.active_runtime()?.ok_or(Error::NoActiveRuntime)?;
    if json {
        let row = serde_json::json!({
            "name": runtime.name(),
            "root": runtime.root(),
        });
        println!("{row}");
    } else {
        println!("{}", runtime.name());
    }
    Ok(0)
}
