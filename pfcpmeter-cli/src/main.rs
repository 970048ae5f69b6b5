//! pfcpmeter -- PFCP capture to labeled dataset converter

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use pfcpmeter_core::config::PfcpmeterConfig;
use pfcpmeter_core::error::PfcpmeterError;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config: config_path,
        log_level,
        output,
        command,
    } = Cli::parse();

    // Load errors are deferred: `config validate` must still be able to report them.
    let loaded = PfcpmeterConfig::load_or_default(&config_path).await;
    let mut general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    if let Some(level) = log_level {
        general.log_level = level;
    }
    logging::init_tracing(&general)?;
    pfcpmeter_core::metrics::describe_all();

    tracing::debug!(config = %config_path.display(), "pfcpmeter starting");

    let writer = OutputWriter::new(output);
    if let Err(e) = run(command, &config_path, loaded, &writer).await {
        use colored::Colorize;
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(
    command: Commands,
    config_path: &Path,
    loaded: Result<PfcpmeterConfig, PfcpmeterError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Convert(args) => commands::convert::execute(args, loaded?, writer).await,
        Commands::Taxonomy => commands::taxonomy::execute(writer),
        Commands::Config(args) => commands::config::execute(args, config_path, writer).await,
    }
}
