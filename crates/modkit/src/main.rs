//! Modkit CLI - Forum extension toolkit
//!
//! This is the main entry point for the Modkit command-line interface.

mod cli;
mod commands;
mod output;
pub mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Run command
    match &cli.command {
        Commands::Hooks(args) => commands::hooks::run(args.clone(), &cli),
        Commands::Package(args) => commands::package::run(args.clone(), &cli),
        Commands::Archive(args) => commands::archive::run(args.clone(), &cli),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Warnings only by default; -v for progress, -vv for detail
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
