mod ai;
mod cli;
mod config;
mod constants;
mod error;
mod extract;
mod mail;
mod pipeline;
mod retry;
mod summary;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// RUST_LOG wins; otherwise info, or debug with --verbose. Logs go to
/// stderr so stdout carries only summaries, or to `log_file` when given.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use std::fs::OpenOptions;

    let default_filter = if verbose { "mailsum=debug" } else { "mailsum=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match cli::run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
