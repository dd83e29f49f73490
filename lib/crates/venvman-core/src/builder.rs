//! Environment-builder collaborator.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Builds a virtual environment at a destination the engine chose.
///
/// Implementations shell out to third-party tooling; the trait exists so
/// commands stay testable without spawning interpreters.
pub trait EnvBuilder {
    /// Populate `env_dir` with an environment based on `python`, using
    /// `prompt` as the shell prompt label.
    ///
    /// # Errors
    ///
    /// [`Error::BuilderUnavailable`] when no builder tooling works for
    /// this interpreter, [`Error::BuilderFailed`] when the creation
    /// subprocess runs but fails.
    fn build(&self, python: &Path, env_dir: &Path, prompt: &str) -> Result<()>;
}

/// Production builder: prefers a `virtualenv` executable on `PATH`, and
/// falls back to the interpreter's own `venv` module.
pub struct VenvCommandBuilder;

impl VenvCommandBuilder {
    fn run(command: &mut Command, python: &Path) -> Result<()> {
        let status = command
            .status()
            .map_err(|e| Error::io(format!("spawning builder for {}", python.display()), e))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::BuilderFailed { status })
        }
    }

    /// Whether `python` ships the standard `venv` machinery.
    fn has_venv_module(python: &Path) -> bool {
        Command::new(python)
            .args(["-c", "import venv, ensurepip"])
            .output()
            .is_ok_and(|out| out.status.success())
    }
}

impl EnvBuilder for VenvCommandBuilder {
    fn build(&self, python: &Path, env_dir: &Path, prompt: &str) -> Result<()> {
        if let Ok(virtualenv) = which::which("virtualenv") {
            return Self::run(
                Command::new(virtualenv)
                    .arg("--python")
                    .arg(python)
                    .arg("--prompt")
                    .arg(prompt)
                    .arg(env_dir),
                python,
            );
        }
        if !Self::has_venv_module(python) {
            return Err(Error::BuilderUnavailable {
                python: python.to_path_buf(),
            });
        }
        Self::run(
            Command::new(python)
                .args(["-m", "venv", "--prompt"])
                .arg(prompt)
                .arg(env_dir),
            python,
        )
    }
}
