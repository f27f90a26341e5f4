use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gri_validator::cli;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("gri_validator=debug,info")
    } else {
        EnvFilter::new("gri_validator=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Validate(args) => {
            if !cli::validate::run(args, cli.format, cli.verbose)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        cli::Commands::Contigs(args) => {
            cli::contigs::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ImportFasta(args) => {
            cli::import::run_fasta(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ImportFai(args) => {
            cli::import::run_fai(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ImportTable(args) => {
            cli::import::run_table(args, cli.format, cli.verbose)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
