//! CLI entry point for the bookshelf tool.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod app;
mod app_config;
mod cli;

use cli::Cli;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Everything requested was shown or followed.
    Success,
    /// An error was reported in the status line.
    Failure,
    /// Setup failed or the page could not be driven at all.
    Fatal,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Fatal => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = app::terminal::resolve_default_log_level(cli.verbose, cli.quiet);
    app::terminal::init_tracing(default_level);
    debug!(?cli, "CLI arguments parsed");

    match app::runtime::run_bookshelf(cli).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Fatal.into()
        }
    }
}
