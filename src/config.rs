//! Server configuration derived from CLI flags.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments accepted by the server binary.
///
/// The server communicates exclusively over stdio (§6); the only other input
/// is an optional path to a `.sln`/`.csproj` to load instead of scanning the
/// current working directory.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "C# Language Server",
    long_about = "LSP-based language server for C#, backed by a tree-sitter powered solution model."
)]
pub struct Args {
    /// Path to a solution or project file. When omitted the server scans the
    /// current working directory for one.
    pub solution_path: Option<PathBuf>,

    #[arg(
        long,
        default_value = "info",
        help = "Set the logging level for the server",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    #[arg(long, help = "Disable ANSI color output in logs")]
    pub no_color: bool,
}

/// Options the server keeps for the lifetime of the session (§3 Data Model).
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub solution_path: Option<PathBuf>,
    pub log_level: String,
}

impl ServerOptions {
    pub fn from_args(args: &Args) -> Self {
        Self {
            solution_path: args.solution_path.clone(),
            log_level: args.log_level.clone(),
        }
    }
}
