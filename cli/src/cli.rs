//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::output::OutputContext;

/// Project-scoped virtual environment manager
#[derive(Parser)]
#[command(name = "venvman", version, arg_required_else_help = true)]
pub struct Cli {
    /// Alternative path marking the project root
    #[arg(long, global = true, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Runtime alias to use instead of the active one
    #[arg(long, global = true, value_name = "ALIAS")]
    pub spec: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a virtual environment from a base interpreter
    Add(commands::add::AddArgs),

    /// Remove a virtual environment
    Remove(commands::remove::RemoveArgs),

    /// Set the project's active virtual environment
    Use(commands::use_cmd::UseArgs),

    /// Show the active virtual environment
    Show,

    /// List virtual environments in this project
    List,

    /// Any other word: run that command inside the selected environment
    #[command(external_subcommand)]
    Exec(Vec<String>),
}

impl Cli {
    /// Execute the parsed command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error when the command fails; `main` maps it to a
    /// stable exit code and diagnostic.
    pub fn run(self) -> Result<i32> {
        let ctx = OutputContext::new(self.no_color, self.quiet);
        let project = commands::discover_project(self.project.as_deref())?;
        match self.command {
            Command::Add(args) => commands::add::run(&ctx, &project, &args),
            Command::Remove(args) => commands::remove::run(&ctx, &project, &args),
            Command::Use(args) => commands::use_cmd::run(&ctx, &project, &args),
            Command::Show => commands::show::run(&project, self.json),
            Command::List => commands::list::run(&ctx, &project, self.json),
            Command::Exec(argv) => commands::exec::run(&project, self.spec.as_deref(), &argv),
        }
    }
}
