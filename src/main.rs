//! Binary entrypoint for dossier-rs.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dossier_rs::cli::output::print_output;
use dossier_rs::cli::{Cli, execute};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("DOSSIER_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = execute(&cli).await?;
    if !output.is_empty() {
        print_output(&output);
    }
    Ok(())
}
