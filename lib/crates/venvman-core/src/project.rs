//! Project discovery and runtime management.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::builder::EnvBuilder;
use crate::error::{Error, Result};
use crate::interpreter::{interpreter_quintuplet, looks_like_path, resolve_interpreter};
use crate::matcher::QuintupletMatcher;
use crate::runtime::Runtime;

/// Directory under the project root holding runtime installations.
pub const RUNTIME_CONTAINER_NAME: &str = ".venvs";

/// Marker file naming the active runtime.
pub const RUNTIME_MARKER_NAME: &str = ".venv";

/// Manifest file recognized as a project root.
pub const PROJECT_MANIFEST_NAME: &str = "pyproject.toml";

/// A filesystem marker that identifies a directory as a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProjectMarker {
    /// A directory with this name (the runtime container).
    Directory(String),
    /// A regular file with this name (a manifest).
    File(String),
}

impl ProjectMarker {
    fn is_satisfied_by(&self, dir: &Path) -> bool {
        match self {
            ProjectMarker::Directory(name) => dir.join(name).is_dir(),
            ProjectMarker::File(name) => dir.join(name).is_file(),
        }
    }
}

/// What the activation marker currently holds.
enum MarkerState {
    /// Regular file containing `<container>/<name>`.
    Pointer(String),
    /// Legacy symlink pointing at a runtime directory.
    Link(PathBuf),
    Absent,
}

/// A directory subtree anchored at a recognized marker, owning zero or
/// more runtimes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Anchor a project at a known root without searching.
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the project owning `start`.
    ///
    /// When `start` names a file, the search begins at its parent and the
    /// file's own name becomes the only marker searched for. Otherwise the
    /// runtime container directory is searched through the whole ancestor
    /// walk before the manifest file is considered, so an enclosing
    /// container outranks a manifest in a nested directory.
    ///
    /// `depth` limits the walk to the start directory plus that many
    /// ancestors; `Some(0)` checks only the start directory itself and
    /// `None` walks to the filesystem root.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectNotFound`] when no marker is found within bounds.
    pub fn discover(start: impl AsRef<Path>, depth: Option<usize>) -> Result<Self> {
        let start = start.as_ref();
        let absolute = std::path::absolute(start)
            .map_err(|e| Error::io(format!("resolving {}", start.display()), e))?;

        let (origin, markers) = if absolute.is_file() {
            let name = absolute
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
            let parent = absolute
                .parent()
                .map_or_else(|| absolute.clone(), Path::to_path_buf);
            (parent, vec![ProjectMarker::File(name)])
        } else {
            let defaults = vec![
                ProjectMarker::Directory(RUNTIME_CONTAINER_NAME.to_string()),
                ProjectMarker::File(PROJECT_MANIFEST_NAME.to_string()),
            ];
            (absolute, defaults)
        };

        for marker in &markers {
            let mut level = Some(origin.as_path());
            let mut remaining = depth;
            while let Some(dir) = level {
                if marker.is_satisfied_by(dir) {
                    return Ok(Self::at(dir));
                }
                match remaining {
                    Some(0) => break,
                    Some(n) => remaining = Some(n - 1),
                    None => {}
                }
                level = dir.parent();
            }
        }
        Err(Error::ProjectNotFound {
            start: start.to_path_buf(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project name — the root directory's final segment. Doubles as the
    /// prompt label for newly created environments.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        self.root
            .file_name()
            .map_or(Cow::Borrowed(""), OsStr::to_string_lossy)
    }

    /// The directory holding this project's runtimes.
    #[must_use]
    pub fn runtime_container(&self) -> PathBuf {
        self.root.join(RUNTIME_CONTAINER_NAME)
    }

    /// The active-runtime marker path.
    #[must_use]
    pub fn runtime_marker(&self) -> PathBuf {
        self.root.join(RUNTIME_MARKER_NAME)
    }

    /// All runtimes physically present in the container, sorted by name
    /// for reproducible listings.
    ///
    /// Non-directory entries are skipped and names are not validated here;
    /// unmanaged directories are excluded later, at matching time. A
    /// missing container yields an empty list.
    ///
    /// # Errors
    ///
    /// I/O failures other than a missing container are surfaced.
    pub fn runtimes(&self) -> Result<Vec<Runtime>> {
        let container = self.runtime_container();
        let entries = match fs::read_dir(&container) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(format!("listing {}", container.display()), e)),
        };
        let mut runtimes = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io(format!("listing {}", container.display()), e))?;
            let path = entry.path();
            if path.is_dir() {
                runtimes.push(Runtime::new(path));
            }
        }
        runtimes.sort_by_key(|runtime| runtime.name().into_owned());
        Ok(runtimes)
    }

    /// The runtime that would live under `name`, without checking that it
    /// exists.
    #[must_use]
    pub fn runtime_named(&self, name: &str) -> Runtime {
        Runtime::new(self.runtime_container().join(name))
    }

    /// Resolve an alias to exactly one runtime.
    ///
    /// The alias is a partial or full quintuplet, or a path to an
    /// interpreter whose quintuplet is computed first. Ambiguity is never
    /// tie-broken: zero or multiple matches both fail, carrying the
    /// candidate list so the caller can surface it.
    ///
    /// # Errors
    ///
    /// [`Error::NoRuntimeMatch`], [`Error::MultipleRuntimeMatches`], or
    /// [`Error::InterpreterNotFound`] for a path alias whose interpreter
    /// does not report an identity.
    pub fn find_runtime(&self, alias: &str) -> Result<Runtime> {
        // A path-looking alias naming a real file selects by that
        // interpreter's identity. Plain aliases win over files in the
        // working directory that happen to share the name.
        let mut effective = Cow::Borrowed(alias);
        if looks_like_path(alias) && Path::new(alias).is_file() {
            let quintuplet = interpreter_quintuplet(Path::new(alias)).ok_or_else(|| {
                Error::InterpreterNotFound {
                    spec: alias.to_string(),
                }
            })?;
            effective = Cow::Owned(quintuplet);
        }

        let tried = self.runtimes()?;
        let Some(matcher) = QuintupletMatcher::from_alias(&effective) else {
            return Err(Error::NoRuntimeMatch {
                alias: alias.to_string(),
                tried,
            });
        };
        let mut matches: Vec<Runtime> = tried
            .iter()
            .filter(|runtime| matcher.matches(&runtime.name()))
            .cloned()
            .collect();
        if matches.len() > 1 {
            return Err(Error::MultipleRuntimeMatches {
                alias: alias.to_string(),
                matches,
            });
        }
        match matches.pop() {
            Some(runtime) => Ok(runtime),
            None => Err(Error::NoRuntimeMatch {
                alias: alias.to_string(),
                tried,
            }),
        }
    }

    /// Mark `runtime` as this project's active runtime.
    ///
    /// Writes `<container>/<name>` with a line-feed line ending to the
    /// marker file, replacing any previous marker. The format is shared
    /// with other tools that read `.venv` pointer files.
    ///
    /// # Errors
    ///
    /// [`Error::MarkerNotAFile`] when something other than a regular file
    /// already sits at the marker path.
    pub fn activate(&self, runtime: &Runtime) -> Result<()> {
        let marker = self.runtime_marker();
        match fs::symlink_metadata(&marker) {
            Ok(meta) if !meta.file_type().is_file() => {
                return Err(Error::MarkerNotAFile { path: marker });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(format!("inspecting {}", marker.display()), e)),
        }
        let content = format!("{RUNTIME_CONTAINER_NAME}/{}\n", runtime.name());
        fs::write(&marker, content)
            .map_err(|e| Error::io(format!("writing {}", marker.display()), e))
    }

    /// Clear the active-runtime marker.
    ///
    /// An already-absent marker is fine; any other removal failure is
    /// surfaced.
    ///
    /// # Errors
    ///
    /// I/O failures other than a missing marker.
    pub fn deactivate(&self) -> Result<()> {
        let marker = self.runtime_marker();
        match fs::remove_file(&marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("removing {}", marker.display()), e)),
        }
    }

    /// The currently active runtime, if a valid marker designates one.
    ///
    /// An invalid marker — wrong container prefix, missing target, a
    /// symlink escaping the container, or a plain directory sitting at the
    /// marker path — means "no active runtime", not an error.
    ///
    /// # Errors
    ///
    /// Only genuine I/O failures while reading the marker are surfaced.
    pub fn active_runtime(&self) -> Result<Option<Runtime>> {
        match self.read_marker()? {
            MarkerState::Absent => Ok(None),
            MarkerState::Pointer(content) => {
                let Some((prefix, name)) = content.split_once('/') else {
                    return Ok(None);
                };
                if prefix != RUNTIME_CONTAINER_NAME || name.is_empty() {
                    return Ok(None);
                }
                let path = self.runtime_container().join(name);
                if path.exists() {
                    Ok(Some(Runtime::new(path)))
                } else {
                    Ok(None)
                }
            }
            MarkerState::Link(marker) => Ok(self.runtime_behind_link(&marker)),
        }
    }

    /// Delete a runtime from disk.
    ///
    /// If the runtime is active, the marker is cleared first and a marker
    /// failure aborts the removal — the marker never outlives the
    /// directory it points at. The runtime directory is deleted
    /// recursively, or unlinked when the root itself is a symlink.
    ///
    /// # Errors
    ///
    /// I/O failures from either step, in marker-then-directory order.
    pub fn remove_runtime(&self, runtime: &Runtime) -> Result<()> {
        if self.active_runtime()?.as_ref() == Some(runtime) {
            self.deactivate()?;
        }
        let root = runtime.root();
        let meta = fs::symlink_metadata(root)
            .map_err(|e| Error::io(format!("inspecting {}", root.display()), e))?;
        if meta.file_type().is_symlink() {
            remove_symlink(root)
        } else {
            fs::remove_dir_all(root)
                .map_err(|e| Error::io(format!("removing {}", root.display()), e))
        }
    }

    /// Create a new runtime for the given base interpreter spec.
    ///
    /// The engine decides the destination (`<container>/<quintuplet>`) and
    /// the prompt label; constructing the environment is delegated to
    /// `builder`.
    ///
    /// # Errors
    ///
    /// [`Error::InterpreterNotFound`] when the spec resolves to nothing or
    /// reports no identity, [`Error::RuntimeExists`] on a name collision,
    /// and the builder's own failures.
    pub fn create_runtime(&self, interpreter_spec: &str, builder: &dyn EnvBuilder) -> Result<Runtime> {
        let python = resolve_interpreter(interpreter_spec)?;
        let name = interpreter_quintuplet(&python).ok_or_else(|| Error::InterpreterNotFound {
            spec: interpreter_spec.to_string(),
        })?;
        let env_dir = self.runtime_container().join(&name);
        if env_dir.exists() {
            return Err(Error::RuntimeExists {
                runtime: Runtime::new(env_dir),
            });
        }
        builder.build(&python, &env_dir, &self.name())?;
        Ok(Runtime::new(env_dir))
    }

    fn read_marker(&self) -> Result<MarkerState> {
        let marker = self.runtime_marker();
        let meta = match fs::symlink_metadata(&marker) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(MarkerState::Absent),
            Err(e) => return Err(Error::io(format!("inspecting {}", marker.display()), e)),
        };
        if meta.file_type().is_file() {
            let content = fs::read_to_string(&marker)
                .map_err(|e| Error::io(format!("reading {}", marker.display()), e))?;
            return Ok(MarkerState::Pointer(content.trim().to_string()));
        }
        if meta.file_type().is_symlink() {
            return Ok(MarkerState::Link(marker));
        }
        // A directory (or other node) at the marker path designates
        // nothing.
        Ok(MarkerState::Absent)
    }

    /// Resolve a legacy symlink marker; valid only when it points at a
    /// directory strictly inside the runtime container.
    fn runtime_behind_link(&self, marker: &Path) -> Option<Runtime> {
        if !fs::metadata(marker).is_ok_and(|meta| meta.is_dir()) {
            return None;
        }
        let target = marker.canonicalize().ok()?;
        let container = self.runtime_container().canonicalize().ok()?;
        if target.starts_with(&container) && target != container {
            Some(Runtime::new(target))
        } else {
            None
        }
    }
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::io(format!("unlinking {}", path.display()), e))
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> Result<()> {
    // Symlinks to directories are directory entries on Windows.
    fs::remove_dir(path)
        .or_else(|_| fs::remove_file(path))
        .map_err(|e| Error::io(format!("unlinking {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_runtimes(names: &[&str]) -> (TempDir, Project) {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(PROJECT_MANIFEST_NAME), "[project]\n").expect("write manifest");
        for name in names {
            fs::create_dir_all(dir.path().join(RUNTIME_CONTAINER_NAME).join(name))
                .expect("create runtime dir");
        }
        let project = Project::at(dir.path());
        (dir, project)
    }

    // ── discovery ────────────────────────────────────────────────────────────

    #[test]
    fn test_discover_finds_manifest_in_start_directory() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(PROJECT_MANIFEST_NAME), "").expect("write manifest");

        let project = Project::discover(dir.path(), None).expect("discover");
        assert_eq!(
            project.root().canonicalize().expect("canonicalize"),
            dir.path().canonicalize().expect("canonicalize")
        );
    }

    #[test]
    fn test_discover_walks_up_to_ancestor_with_marker() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(PROJECT_MANIFEST_NAME), "").expect("write manifest");
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).expect("create nested");

        let project = Project::discover(&nested, None).expect("discover");
        assert_eq!(
            project.root().canonicalize().expect("canonicalize"),
            dir.path().canonicalize().expect("canonicalize")
        );
    }

    #[test]
    fn test_discover_depth_zero_only_checks_start_directory() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(PROJECT_MANIFEST_NAME), "").expect("write manifest");
        let nested = dir.path().join("src");
        fs::create_dir_all(&nested).expect("create nested");

        let err = Project::discover(&nested, Some(0)).expect_err("marker is in the parent");
        assert!(matches!(err, Error::ProjectNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn test_discover_depth_one_reaches_direct_parent() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(PROJECT_MANIFEST_NAME), "").expect("write manifest");
        let nested = dir.path().join("src");
        fs::create_dir_all(&nested).expect("create nested");

        let project = Project::discover(&nested, Some(1)).expect("discover");
        assert_eq!(
            project.root().canonicalize().expect("canonicalize"),
            dir.path().canonicalize().expect("canonicalize")
        );
    }

    #[test]
    fn test_discover_container_outranks_nested_manifest() {
        // The enclosing project carries a runtime container; a nested
        // directory carries only a manifest. Discovery from the nested
        // directory must land on the container's owner.
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join(RUNTIME_CONTAINER_NAME)).expect("create container");
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).expect("create nested");
        fs::write(nested.join(PROJECT_MANIFEST_NAME), "").expect("write nested manifest");

        let project = Project::discover(&nested, None).expect("discover");
        assert_eq!(
            project.root().canonicalize().expect("canonicalize"),
            dir.path().canonicalize().expect("canonicalize")
        );
    }

    #[test]
    fn test_discover_file_start_uses_parent_and_file_name_as_marker() {
        let dir = TempDir::new().expect("tempdir");
        let custom = dir.path().join("custom-manifest.toml");
        fs::write(&custom, "").expect("write custom marker");

        let project = Project::discover(&custom, Some(0)).expect("discover");
        assert_eq!(
            project.root().canonicalize().expect("canonicalize"),
            dir.path().canonicalize().expect("canonicalize")
        );
    }

    #[test]
    fn test_discover_failure_carries_original_start_path() {
        let dir = TempDir::new().expect("tempdir");
        let err = Project::discover(dir.path(), Some(0)).expect_err("no marker anywhere");
        match err {
            Error::ProjectNotFound { start } => assert_eq!(start, dir.path()),
            other => panic!("expected ProjectNotFound, got {other:?}"),
        }
    }

    // ── registry ─────────────────────────────────────────────────────────────

    #[test]
    fn test_runtimes_empty_when_container_missing() {
        let dir = TempDir::new().expect("tempdir");
        let project = Project::at(dir.path());
        assert!(project.runtimes().expect("runtimes").is_empty());
    }

    #[test]
    fn test_runtimes_lists_directories_sorted_and_skips_files() {
        let (_dir, project) = project_with_runtimes(&[
            "cpython-3.9-linux-x86_64-aaaaaaaa",
            "cpython-3.10-linux-x86_64-bbbbbbbb",
        ]);
        fs::write(project.runtime_container().join("stray.txt"), "").expect("write stray");

        let names: Vec<String> = project
            .runtimes()
            .expect("runtimes")
            .iter()
            .map(|runtime| runtime.name().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "cpython-3.10-linux-x86_64-bbbbbbbb".to_string(),
                "cpython-3.9-linux-x86_64-aaaaaaaa".to_string(),
            ]
        );
    }

    #[test]
    fn test_runtime_named_does_not_check_existence() {
        let (_dir, project) = project_with_runtimes(&[]);
        let runtime = project.runtime_named("cpython-3.12-linux-x86_64-cafebabe");
        assert_eq!(
            runtime.root(),
            project
                .runtime_container()
                .join("cpython-3.12-linux-x86_64-cafebabe")
        );
    }

    // ── alias resolution ─────────────────────────────────────────────────────

    #[test]
    fn test_find_runtime_unique_match() {
        let (_dir, project) = project_with_runtimes(&[
            "cpython-3.9-linux-x86_64-aaaaaaaa",
            "cpython-3.10-linux-x86_64-bbbbbbbb",
        ]);
        let runtime = project.find_runtime("cpython-3.9").expect("unique match");
        assert_eq!(runtime.name(), "cpython-3.9-linux-x86_64-aaaaaaaa");
    }

    #[test]
    fn test_find_runtime_ambiguous_alias_lists_matches() {
        let (_dir, project) = project_with_runtimes(&[
            "cpython-3.9-linux-x86_64-aaaaaaaa",
            "cpython-3.10-linux-x86_64-bbbbbbbb",
        ]);
        let err = project.find_runtime("cpython").expect_err("ambiguous");
        match err {
            Error::MultipleRuntimeMatches { alias, matches } => {
                assert_eq!(alias, "cpython");
                assert_eq!(matches.len(), 2);
            }
            other => panic!("expected MultipleRuntimeMatches, got {other:?}"),
        }
    }

    #[test]
    fn test_find_runtime_no_match_lists_all_tried() {
        let (_dir, project) = project_with_runtimes(&[
            "cpython-3.9-linux-x86_64-aaaaaaaa",
            "cpython-3.10-linux-x86_64-bbbbbbbb",
        ]);
        let err = project.find_runtime("pypy").expect_err("no match");
        match err {
            Error::NoRuntimeMatch { alias, tried } => {
                assert_eq!(alias, "pypy");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("expected NoRuntimeMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_find_runtime_overlong_alias_reports_no_match() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let err = project
            .find_runtime("a-b-c-d-e-f")
            .expect_err("unparsable alias");
        assert!(matches!(err, Error::NoRuntimeMatch { .. }), "got {err:?}");
    }

    #[test]
    fn test_find_runtime_ignores_non_quintuplet_directories() {
        let (_dir, project) =
            project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa", "scratch"]);
        let runtime = project.find_runtime("3.9").expect("unique match");
        assert_eq!(runtime.name(), "cpython-3.9-linux-x86_64-aaaaaaaa");
    }

    #[cfg(unix)]
    #[test]
    fn test_find_runtime_interpreter_path_alias_uses_reported_identity() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let fake = dir.path().join("python");
        fs::write(&fake, "#!/bin/sh\necho cpython-3.9-linux-x86_64-aaaaaaaa\n")
            .expect("write fake interpreter");
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).expect("chmod");

        let alias = fake.to_str().expect("utf8 path");
        let runtime = project.find_runtime(alias).expect("path alias resolves");
        assert_eq!(runtime.name(), "cpython-3.9-linux-x86_64-aaaaaaaa");
    }

    #[cfg(unix)]
    #[test]
    fn test_find_runtime_silent_interpreter_path_fails_interpreter_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let fake = dir.path().join("python");
        fs::write(&fake, "#!/bin/sh\nexit 0\n").expect("write silent interpreter");
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).expect("chmod");

        let err = project
            .find_runtime(fake.to_str().expect("utf8 path"))
            .expect_err("no identity reported");
        assert!(matches!(err, Error::InterpreterNotFound { .. }), "got {err:?}");
    }

    // ── activation ───────────────────────────────────────────────────────────

    #[test]
    fn test_activate_then_get_active_round_trips() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");

        project.activate(&runtime).expect("activate");
        let active = project.active_runtime().expect("read marker");
        assert_eq!(active.as_ref(), Some(&runtime));
    }

    #[test]
    fn test_activate_writes_container_relative_pointer_with_lf() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");

        project.activate(&runtime).expect("activate");
        let content = fs::read_to_string(project.runtime_marker()).expect("read marker");
        assert_eq!(content, ".venvs/cpython-3.9-linux-x86_64-aaaaaaaa\n");
    }

    #[test]
    fn test_activate_is_idempotent() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");

        project.activate(&runtime).expect("first activate");
        let first = fs::read_to_string(project.runtime_marker()).expect("read marker");
        project.activate(&runtime).expect("second activate");
        let second = fs::read_to_string(project.runtime_marker()).expect("read marker");
        assert_eq!(first, second);
        assert_eq!(
            project.active_runtime().expect("read marker").as_ref(),
            Some(&runtime)
        );
    }

    #[test]
    fn test_activate_refuses_directory_at_marker_path() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");
        fs::create_dir(project.runtime_marker()).expect("create dir at marker path");

        let err = project.activate(&runtime).expect_err("marker is a directory");
        assert!(matches!(err, Error::MarkerNotAFile { .. }), "got {err:?}");
    }

    #[test]
    fn test_deactivate_then_get_active_is_none() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");

        project.activate(&runtime).expect("activate");
        project.deactivate().expect("deactivate");
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_deactivate_without_marker_is_noop() {
        let (_dir, project) = project_with_runtimes(&[]);
        project.deactivate().expect("deactivate with no marker");
    }

    #[test]
    fn test_get_active_none_when_marker_absent() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_get_active_none_when_prefix_is_foreign() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        fs::write(
            project.runtime_marker(),
            "elsewhere/cpython-3.9-linux-x86_64-aaaaaaaa\n",
        )
        .expect("write marker");
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_get_active_none_when_pointer_has_no_separator() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        fs::write(project.runtime_marker(), "not-a-pointer\n").expect("write marker");
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_get_active_none_when_target_runtime_is_gone() {
        let (_dir, project) = project_with_runtimes(&[]);
        fs::create_dir_all(project.runtime_container()).expect("create container");
        fs::write(
            project.runtime_marker(),
            ".venvs/cpython-3.9-linux-x86_64-aaaaaaaa\n",
        )
        .expect("write marker");
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_get_active_accepts_symlink_into_container() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let target = project
            .runtime_container()
            .join("cpython-3.9-linux-x86_64-aaaaaaaa");
        std::os::unix::fs::symlink(&target, project.runtime_marker()).expect("symlink marker");

        let active = project.active_runtime().expect("read marker");
        let active = active.expect("symlink marker is valid");
        assert_eq!(
            active.root(),
            target.canonicalize().expect("canonicalize target")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_get_active_rejects_symlink_escaping_container() {
        let (dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).expect("create outside dir");
        std::os::unix::fs::symlink(&outside, project.runtime_marker()).expect("symlink marker");

        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_get_active_rejects_dangling_symlink() {
        let (dir, project) = project_with_runtimes(&[]);
        std::os::unix::fs::symlink(dir.path().join("gone"), project.runtime_marker())
            .expect("symlink marker");

        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_get_active_none_when_directory_sits_at_marker_path() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        fs::create_dir(project.runtime_marker()).expect("create dir at marker path");
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    // ── removal ──────────────────────────────────────────────────────────────

    #[test]
    fn test_remove_runtime_deletes_directory() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");

        project.remove_runtime(&runtime).expect("remove");
        assert!(!runtime.root().exists());
    }

    #[test]
    fn test_remove_active_runtime_clears_marker_first() {
        let (_dir, project) = project_with_runtimes(&["cpython-3.9-linux-x86_64-aaaaaaaa"]);
        let runtime = project.find_runtime("3.9").expect("resolve");
        project.activate(&runtime).expect("activate");

        project.remove_runtime(&runtime).expect("remove");
        assert!(!runtime.root().exists());
        assert!(!project.runtime_marker().exists());
        assert!(project.active_runtime().expect("read marker").is_none());
    }

    #[test]
    fn test_remove_inactive_runtime_keeps_marker() {
        let (_dir, project) = project_with_runtimes(&[
            "cpython-3.9-linux-x86_64-aaaaaaaa",
            "cpython-3.10-linux-x86_64-bbbbbbbb",
        ]);
        let keep = project.find_runtime("3.10").expect("resolve keep");
        let doomed = project.find_runtime("3.9").expect("resolve doomed");
        project.activate(&keep).expect("activate");

        project.remove_runtime(&doomed).expect("remove");
        assert!(keep.root().exists());
        assert_eq!(
            project.active_runtime().expect("read marker").as_ref(),
            Some(&keep)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_symlinked_runtime_unlinks_without_touching_target() {
        let (dir, project) = project_with_runtimes(&[]);
        let real = dir.path().join("real-env");
        fs::create_dir_all(&real).expect("create real env");
        fs::create_dir_all(project.runtime_container()).expect("create container");
        let link = project
            .runtime_container()
            .join("cpython-3.9-linux-x86_64-aaaaaaaa");
        std::os::unix::fs::symlink(&real, &link).expect("symlink runtime");

        project
            .remove_runtime(&Runtime::new(&link))
            .expect("remove symlinked runtime");
        assert!(!link.exists());
        assert!(real.exists(), "the link target must survive");
    }

    // ── creation ─────────────────────────────────────────────────────────────

    #[cfg(unix)]
    mod creation {
        use super::*;

        struct FakeBuilder;

        impl EnvBuilder for FakeBuilder {
            fn build(&self, _python: &Path, env_dir: &Path, _prompt: &str) -> Result<()> {
                fs::create_dir_all(env_dir.join("bin"))
                    .map_err(|e| Error::io("fake builder", e))?;
                Ok(())
            }
        }

        fn fake_interpreter(dir: &Path, quintuplet: &str) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;

            let fake = dir.join("python");
            fs::write(&fake, format!("#!/bin/sh\necho {quintuplet}\n"))
                .expect("write fake interpreter");
            fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).expect("chmod");
            fake
        }

        #[test]
        fn test_create_runtime_places_env_under_quintuplet_name() {
            let (dir, project) = project_with_runtimes(&[]);
            let fake = fake_interpreter(dir.path(), "cpython-3.12-linux-x86_64-cafebabe");

            let runtime = project
                .create_runtime(fake.to_str().expect("utf8"), &FakeBuilder)
                .expect("create");
            assert_eq!(runtime.name(), "cpython-3.12-linux-x86_64-cafebabe");
            assert!(runtime.root().join("bin").is_dir());
        }

        #[test]
        fn test_create_runtime_collision_fails_runtime_exists() {
            let (dir, project) = project_with_runtimes(&["cpython-3.12-linux-x86_64-cafebabe"]);
            let fake = fake_interpreter(dir.path(), "cpython-3.12-linux-x86_64-cafebabe");

            let err = project
                .create_runtime(fake.to_str().expect("utf8"), &FakeBuilder)
                .expect_err("name collision");
            assert!(matches!(err, Error::RuntimeExists { .. }), "got {err:?}");
        }

        #[test]
        fn test_create_runtime_unresolvable_spec_fails_interpreter_not_found() {
            let (_dir, project) = project_with_runtimes(&[]);
            let err = project
                .create_runtime("definitely-not-an-interpreter-name", &FakeBuilder)
                .expect_err("unresolvable spec");
            assert!(matches!(err, Error::InterpreterNotFound { .. }), "got {err:?}");
        }
    }
}
