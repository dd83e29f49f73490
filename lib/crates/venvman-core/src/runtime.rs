//! On-disk virtual environment representation.

use std::borrow::Cow;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Subdirectories that may hold a runtime's executables, in search order.
const BIN_DIR_NAMES: [&str; 2] = ["bin", "Scripts"];

/// An isolated interpreter installation rooted at a directory inside the
/// project's runtime container.
///
/// Construction never touches the filesystem; accessors that need the
/// directory contents fail with [`Error::RuntimeInvalid`] when the layout
/// is not usable. Two runtimes are equal iff their roots are equal.
#[derive(Debug, Clone)]
pub struct Runtime {
    root: PathBuf,
}

impl PartialEq for Runtime {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for Runtime {}

impl Runtime {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The runtime's name — the final path segment, conventionally an
    /// `implementation-version-system-platform-hash` quintuplet.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        self.root
            .file_name()
            .map_or(Cow::Borrowed(""), OsStr::to_string_lossy)
    }

    /// Executable directories that actually exist under this runtime.
    #[must_use]
    pub fn bin_dirs(&self) -> Vec<PathBuf> {
        BIN_DIR_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .filter(|dir| dir.is_dir())
            .collect()
    }

    /// Derive the `PATH` value for processes launched inside this runtime:
    /// the runtime's executable directories prepended to `base`.
    ///
    /// Pass an empty `base` to search the runtime directories only.
    #[must_use]
    pub fn search_path(&self, base: &OsStr) -> OsString {
        let mut entries = self.bin_dirs();
        if !base.is_empty() {
            entries.extend(env::split_paths(base));
        }
        // join_paths only fails on an entry containing the separator, which
        // split_paths never yields and bin_dirs only produces if the
        // project root itself contains one.
        env::join_paths(entries).unwrap_or_default()
    }

    /// Path to the contained `python` executable, searched in the
    /// runtime's own executable directories.
    ///
    /// The result is canonicalized unless it is a symlink: venv relies on
    /// the symlink's location to detect in-environment invocation, so the
    /// link must be kept as-is.
    ///
    /// # Errors
    ///
    /// [`Error::RuntimeInvalid`] if no interpreter is found.
    pub fn python(&self) -> Result<PathBuf> {
        let scoped = self.search_path(OsStr::new(""));
        let cwd = env::current_dir().map_err(|e| Error::io("reading current directory", e))?;
        let found = which::which_in("python", Some(scoped), cwd).map_err(|_| {
            Error::RuntimeInvalid {
                root: self.root.clone(),
            }
        })?;
        resolve_unless_symlink(&found)
    }

    /// The runtime's site-packages directory.
    ///
    /// # Errors
    ///
    /// [`Error::RuntimeInvalid`] if no library directory exists.
    pub fn site_packages(&self) -> Result<PathBuf> {
        if let Some(dir) = posix_site_packages(&self.root) {
            return Ok(dir);
        }
        let windows = self.root.join("Lib").join("site-packages");
        if windows.is_dir() {
            return Ok(windows);
        }
        Err(Error::RuntimeInvalid {
            root: self.root.clone(),
        })
    }
}

/// Find `lib/pythonX.Y/site-packages` without assuming a version.
fn posix_site_packages(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root.join("lib")).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with("python") || !name.contains('.') {
            continue;
        }
        let candidate = entry.path().join("site-packages");
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    None
}

/// Canonicalize `path` unless it is a symlink.
pub(crate) fn resolve_unless_symlink(path: &Path) -> Result<PathBuf> {
    let meta = std::fs::symlink_metadata(path)
        .map_err(|e| Error::io(format!("inspecting {}", path.display()), e))?;
    if meta.file_type().is_symlink() {
        return Ok(path.to_path_buf());
    }
    path.canonicalize()
        .map_err(|e| Error::io(format!("resolving {}", path.display()), e))
}
