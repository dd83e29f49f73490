//! Launching commands inside a runtime.
//!
//! The launcher derives a scoped process environment — `PATH` rewritten so
//! the runtime's executable directories come first, `VIRTUAL_ENV` pointing
//! at the runtime root — and resolves the requested command against that
//! rewritten path, so runtime-provided executables shadow global ones.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::error::{Error, Result};
use crate::interpreter::looks_like_path;
use crate::runtime::{Runtime, resolve_unless_symlink};

/// Environment variable naming the active environment for child
/// processes.
pub const ISOLATION_VAR: &str = "VIRTUAL_ENV";

/// A command prepared to run inside a runtime.
pub struct Launcher {
    command: String,
    args: Vec<String>,
    path: OsString,
    runtime_root: PathBuf,
}

impl Launcher {
    /// Bind a command and its arguments to `runtime`, deriving the search
    /// path from the current process environment.
    #[must_use]
    pub fn new(runtime: &Runtime, command: impl Into<String>, args: Vec<String>) -> Self {
        let base = env::var_os("PATH").unwrap_or_default();
        Self {
            command: command.into(),
            args,
            path: runtime.search_path(&base),
            runtime_root: runtime.root().to_path_buf(),
        }
    }

    /// Resolve the command token against the derived search path.
    ///
    /// Path-looking tokens resolve directly as files. The result is
    /// canonicalized unless it is a symlink — venv needs the symlink
    /// location intact to recognize in-environment invocation.
    fn resolve_command(&self) -> Option<PathBuf> {
        let resolved = if looks_like_path(&self.command) {
            let direct = PathBuf::from(&self.command);
            if !direct.is_file() {
                return None;
            }
            direct
        } else {
            let cwd = env::current_dir().ok()?;
            which::which_in(&self.command, Some(&self.path), cwd).ok()?
        };
        resolve_unless_symlink(&resolved).ok()
    }

    /// Run the command, replacing this process.
    ///
    /// This only returns on failure: the resolved image takes over the
    /// process, and the child's exit status becomes this process's status.
    /// The original command token is preserved as `argv[0]`.
    ///
    /// # Errors
    ///
    /// [`Error::CommandNotFound`] when nothing resolves; otherwise the
    /// `exec` failure itself.
    #[cfg(unix)]
    pub fn run(&self) -> Result<ExitStatus> {
        use std::os::unix::process::CommandExt;
        use std::process::Command;

        let Some(resolved) = self.resolve_command() else {
            return Err(Error::CommandNotFound {
                command: self.command.clone(),
            });
        };
        let mut command = Command::new(&resolved);
        command
            .arg0(&self.command)
            .args(&self.args)
            .env("PATH", &self.path)
            .env(ISOLATION_VAR, &self.runtime_root);
        let err = command.exec();
        Err(Error::io(format!("executing {}", resolved.display()), err))
    }

    /// Run the command and relay the child's own exit status, unmodified.
    ///
    /// An unresolvable token falls back to the native shell with
    /// cmd-style quoting, so shell builtins keep working.
    ///
    /// # Errors
    ///
    /// Spawn failures are surfaced with their OS error.
    #[cfg(windows)]
    pub fn run(&self) -> Result<ExitStatus> {
        use std::os::windows::process::CommandExt;
        use std::process::Command;

        let mut command = match self.resolve_command() {
            Some(resolved) => {
                let mut command = Command::new(resolved);
                command.args(&self.args);
                command
            }
            None => {
                let comspec = env::var_os("COMSPEC").unwrap_or_else(|| OsString::from("cmd.exe"));
                let mut command = Command::new(comspec);
                command.arg("/C").raw_arg(cmdify(&self.command, &self.args));
                command
            }
        };
        command
            .env("PATH", &self.path)
            .env(ISOLATION_VAR, &self.runtime_root)
            .status()
            .map_err(|e| Error::io(format!("running {}", self.command), e))
    }
}

/// Encode a command and its arguments into a single string for the
/// Windows shell to interpret.
///
/// A token is only wrapped in double quotes when it contains foul
/// characters — whitespace for arguments, whitespace or parentheses for
/// the command token — so cmd builtins and DOS-style switches keep
/// working unquoted.
#[must_use]
pub fn cmdify(command: &str, args: &[String]) -> String {
    let mut pieces = vec![quote_if(command, command_foul)];
    pieces.extend(args.iter().map(|arg| quote_if(arg, char::is_whitespace)));
    pieces.join(" ")
}

fn command_foul(ch: char) -> bool {
    ch.is_whitespace() || ch == '(' || ch == ')'
}

fn quote_if(value: &str, foul: fn(char) -> bool) -> String {
    if value.contains(foul) {
        quote(value)
    } else {
        value.to_string()
    }
}

/// Wrap `value` in double quotes, doubling any backslashes that
/// immediately precede an embedded quote and escaping the quote itself.
/// Backslashes elsewhere stay as-is; cmd takes them literally.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut pending_backslashes = 0usize;
    for ch in value.chars() {
        match ch {
            '\\' => pending_backslashes += 1,
            '"' => {
                for _ in 0..pending_backslashes * 2 {
                    out.push('\\');
                }
                pending_backslashes = 0;
                out.push('\\');
                out.push('"');
            }
            other => {
                for _ in 0..pending_backslashes {
                    out.push('\\');
                }
                pending_backslashes = 0;
                out.push(other);
            }
        }
    }
    for _ in 0..pending_backslashes {
        out.push('\\');
    }
    out.push('"');
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Tokens without whitespace, parentheses, or quotes pass through
        /// cmdify untouched.
        #[test]
        fn prop_clean_tokens_are_verbatim(token in "[a-zA-Z0-9_./:-]{1,20}") {
            let rendered = cmdify(&token, &[]);
            prop_assert_eq!(rendered, token);
        }

        /// Any argument containing whitespace comes out wrapped in quotes.
        #[test]
        fn prop_whitespace_arguments_are_quoted(
            left in "[a-z]{1,8}",
            right in "[a-z]{1,8}",
        ) {
            let arg = format!("{left} {right}");
            let rendered = cmdify("run", &[arg.clone()]);
            prop_assert!(rendered.starts_with("run \""), "got {rendered}");
            prop_assert!(rendered.ends_with('"'), "got {rendered}");
        }

        /// Quoting never loses or reorders the non-quote characters of the
        /// original argument.
        #[test]
        fn prop_quoting_preserves_plain_characters(arg in "[a-z ]{1,20}") {
            let rendered = cmdify("run", &[arg.clone()]);
            let stripped: String = rendered
                .trim_start_matches("run ")
                .chars()
                .filter(|c| *c != '"')
                .collect();
            prop_assert_eq!(stripped, arg);
        }
    }
}
