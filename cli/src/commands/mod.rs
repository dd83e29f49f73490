//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;
use venvman_core::Project;

pub mod add;
pub mod exec;
pub mod list;
pub mod remove;
pub mod show;
pub mod use_cmd;

/// Discover the project for this invocation.
///
/// An explicit `--project` path bounds the search to that exact location
/// (depth 0), so the walk cannot escape into enclosing directories; it may
/// name a marker file directly. Without it, the search walks up from the
/// working directory.
pub fn discover_project(explicit: Option<&Path>) -> Result<Project> {
    let project = match explicit {
        Some(path) => Project::discover(path, Some(0))?,
        None => Project::discover(".", None)?,
    };
    Ok(project)
}
