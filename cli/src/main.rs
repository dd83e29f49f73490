//! venvman — project-scoped virtual environment manager.

use clap::Parser;

mod cli;
mod commands;
mod output;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let code = match cli.run() {
        Ok(code) => code,
        Err(err) => report(&err),
    };
    std::process::exit(code);
}

/// Print a one-line diagnostic — plus candidate lists where they help the
/// user pick — and map the error to its stable exit code.
fn report(err: &anyhow::Error) -> i32 {
    eprintln!("Error: {err}");
    let Some(core) = err.downcast_ref::<venvman_core::Error>() else {
        return 1;
    };
    match core {
        venvman_core::Error::NoRuntimeMatch { tried, .. } if !tried.is_empty() => {
            eprintln!("Runtimes tried:");
            for runtime in tried {
                eprintln!("  {}", runtime.name());
            }
        }
        venvman_core::Error::MultipleRuntimeMatches { matches, .. } => {
            eprintln!("Candidates:");
            for runtime in matches {
                eprintln!("  {}", runtime.name());
            }
        }
        _ => {}
    }
    core.exit_code()
}
