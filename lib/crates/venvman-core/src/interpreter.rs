//! Base interpreter resolution and quintuplet identification.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Version-style interpreter specs (`3`, `3.11`, `3.11-64`) that are
/// delegated to the `py` launcher rather than searched on `PATH`.
#[allow(clippy::expect_used)]
static VERSION_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)?(-(32|64))?$").expect("version spec pattern is valid")
});

/// Program the target interpreter runs to self-report its identity as
/// `implementation-major.minor-system-platform-hash8`, lowercased.
///
/// The prefix walks `real_prefix` → `base_prefix` → `prefix` so the hash
/// reflects the most "base" installation even when the interpreter is
/// itself running inside another environment (virtualenv only preserves
/// `real_prefix`).
const QUINTUPLET_PROGRAM: &str = r#"
from __future__ import print_function
import hashlib
import platform
import sys
import sysconfig

try:
    prefix = sys.real_prefix
except AttributeError:
    try:
        prefix = sys.base_prefix
    except AttributeError:
        prefix = sys.prefix

prefix = prefix.encode(sys.getfilesystemencoding(), "ignore")

print("{impl}-{vers}-{syst}-{plat}-{hash}".format(
    impl=platform.python_implementation(),
    vers=sysconfig.get_python_version(),
    syst=platform.uname().system,
    plat=sysconfig.get_platform().split("-")[-1],
    hash=hashlib.sha256(prefix).hexdigest()[:8],
).lower())
"#;

/// Whether a spec string names a filesystem path rather than an
/// executable name or version alias.
///
/// Only a path separator qualifies; a bare name equal to a file in the
/// working directory is still treated as a name.
#[must_use]
pub fn looks_like_path(value: &str) -> bool {
    if value.contains(std::path::MAIN_SEPARATOR) {
        return true;
    }
    // Windows accepts both separators.
    cfg!(windows) && value.contains('/')
}

pub(crate) fn is_version_spec(value: &str) -> bool {
    VERSION_SPEC.is_match(value)
}

/// Capture a subprocess's single line of stdout. `None` on spawn failure,
/// nonzero exit, or empty output.
fn command_line_output(command: &mut Command) -> Option<String> {
    let output = command.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Ask the `py` launcher for the interpreter matching a version spec.
fn find_with_py_launcher(spec: &str) -> Result<PathBuf> {
    let not_found = || Error::InterpreterNotFound {
        spec: spec.to_string(),
    };
    let py = which::which("py").map_err(|_| not_found())?;
    let reported = command_line_output(
        Command::new(py)
            .arg(format!("-{spec}"))
            .args(["-c", "import sys; print(sys.executable)"]),
    )
    .ok_or_else(not_found)?;
    let path = PathBuf::from(reported);
    path.canonicalize()
        .map_err(|e| Error::io(format!("resolving {}", path.display()), e))
}

/// Resolve a user-supplied base interpreter spec to an executable path.
///
/// Specs are tried as, in order: a version for the `py` launcher, a
/// filesystem path (taken verbatim; usability is checked when the
/// interpreter is invoked), and an executable name on `PATH`.
///
/// # Errors
///
/// [`Error::InterpreterNotFound`] if the spec resolves to nothing.
pub fn resolve_interpreter(spec: &str) -> Result<PathBuf> {
    if is_version_spec(spec) {
        return find_with_py_launcher(spec);
    }
    if looks_like_path(spec) {
        return Ok(PathBuf::from(spec));
    }
    which::which(spec).map_err(|_| Error::InterpreterNotFound {
        spec: spec.to_string(),
    })
}

/// Ask an interpreter to self-report its quintuplet.
///
/// Only the interpreter reliably knows its own implementation, version,
/// and install prefix — arbitrary third-party interpreters included — so
/// this shells out instead of inspecting the filesystem. `None` when the
/// interpreter cannot be invoked or reports nothing; callers treat that
/// as an unresolvable interpreter.
#[must_use]
pub fn interpreter_quintuplet(python: &Path) -> Option<String> {
    command_line_output(Command::new(python).args(["-c", QUINTUPLET_PROGRAM]))
}
