//! Geex CLI - Command-line shell
//!
//! Loads settings, builds and records Earth Engine extraction jobs, and
//! prints regions of interest for confirmation before submission.

mod cli;
mod commands;
mod output;
mod output_types;
mod submitter;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use output::OutputWriter;

fn main() -> ExitCode {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    match commands::execute(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
