//! heapscope CLI entry point
//!
//! Loads configuration, initializes logging and dispatches the subcommand.
//! Errors are printed to stderr and mapped to an exit code by [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (source, mut loaded) = commands::config::load_config(cli.config.as_deref()).await;

    // fall back to default logging so `config validate` can still report a broken file
    let mut general = loaded
        .as_ref()
        .map(|config| config.general.clone())
        .unwrap_or_default();
    if let Some(level) = cli.log_level {
        if let Ok(config) = loaded.as_mut() {
            config.general.log_level = level.clone();
            config.validate()?;
        }
        general.log_level = level;
    }
    logging::init_tracing(&general)?;
    heapscope_core::metrics::describe_all();

    tracing::debug!(source = %source, "configuration resolved");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, &loaded?, &writer).await,
        Commands::Preprocess(args) => {
            commands::preprocess::execute(args, &loaded?, &writer).await
        }
        Commands::Config(args) => commands::config::execute(args, &source, loaded, &writer),
    }
}
