//! Project-scoped virtual environment management.
//!
//! This crate locates a project root, enumerates the virtual environments
//! stored under its runtime container, resolves partial quintuplet aliases
//! to exactly one environment, tracks the active environment through a
//! marker file, and derives the process environment for launching commands
//! inside a selected environment.
//!
//! The CLI layer lives in a separate crate; everything here is synchronous,
//! filesystem-backed, and returns typed errors.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod error;
pub mod interpreter;
pub mod launch;
pub mod matcher;
pub mod project;
pub mod runtime;

pub use builder::{EnvBuilder, VenvCommandBuilder};
pub use error::{Error, Result};
pub use launch::Launcher;
pub use matcher::QuintupletMatcher;
pub use project::{PROJECT_MANIFEST_NAME, Project, RUNTIME_CONTAINER_NAME, RUNTIME_MARKER_NAME};
pub use runtime::Runtime;
