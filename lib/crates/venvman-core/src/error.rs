//! Typed error taxonomy for runtime management.
//!
//! Every variant maps to a stable process exit code so the CLI reports
//! failures consistently across releases. Underlying filesystem errors are
//! carried as sources rather than reclassified.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::Runtime;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while locating, selecting, creating, or
/// launching a runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// No recognized project marker along the search path.
    #[error("no project found from {}", .start.display())]
    ProjectNotFound { start: PathBuf },

    /// A base interpreter spec could not be resolved to an executable.
    #[error("interpreter not found for '{spec}'")]
    InterpreterNotFound { spec: String },

    /// Creation would collide with an existing runtime directory.
    #[error("runtime '{}' already exists; remove it first", .runtime.name())]
    RuntimeExists { runtime: Runtime },

    /// The alias matched none of the registered runtimes.
    #[error("alias '{alias}' does not match any runtime")]
    NoRuntimeMatch { alias: String, tried: Vec<Runtime> },

    /// The alias matched more than one runtime; the caller must
    /// disambiguate.
    #[error("alias '{alias}' is ambiguous")]
    MultipleRuntimeMatches { alias: String, matches: Vec<Runtime> },

    /// A runtime directory exists but lacks a discoverable interpreter or
    /// library directory.
    #[error("runtime at {} has no usable interpreter or site-packages", .root.display())]
    RuntimeInvalid { root: PathBuf },

    /// An operation required an active runtime and none is set.
    #[error("no active runtime; set one with 'venvman use <alias>' or pass --spec")]
    NoActiveRuntime,

    /// The launch target is not resolvable inside the runtime's scoped
    /// search path.
    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    /// The environment builder cannot run for this interpreter/platform.
    #[error("no environment builder available for {}", .python.display())]
    BuilderUnavailable { python: PathBuf },

    /// The environment builder subprocess ran but did not succeed.
    #[error("environment builder failed with {status}")]
    BuilderFailed { status: std::process::ExitStatus },

    /// Refusal to overwrite something other than a regular file sitting at
    /// the activation marker path.
    #[error("activation marker {} exists but is not a regular file", .path.display())]
    MarkerNotAFile { path: PathBuf },

    /// An OS-level failure, surfaced with its original error.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Stable process exit code for this error kind.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ProjectNotFound { .. } => 2,
            Error::InterpreterNotFound { .. } => 3,
            Error::RuntimeExists { .. } => 4,
            Error::NoRuntimeMatch { .. } => 5,
            Error::MultipleRuntimeMatches { .. } => 6,
            Error::RuntimeInvalid { .. } => 7,
            Error::NoActiveRuntime => 8,
            Error::CommandNotFound { .. } => 9,
            Error::BuilderUnavailable { .. } => 10,
            Error::BuilderFailed { .. } | Error::MarkerNotAFile { .. } | Error::Io { .. } => 1,
        }
    }

    /// Wrap an I/O error with a human-readable context line.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}
