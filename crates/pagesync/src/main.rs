//! pagesync CLI - publish a markdown vault to Confluence Cloud.
//!
//! Provides commands for:
//! - `publish`: Create or update one Confluence page per publishable note

mod commands;
mod error;
mod output;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::PublishArgs;
use output::Output;

/// pagesync - Markdown vault to Confluence publisher.
#[derive(Parser)]
#[command(name = "pagesync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish notes to Confluence.
    Publish(PublishArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Publish(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        let mut source = err.source();
        while let Some(cause) = source {
            output.error(&format!("  caused by: {cause}"));
            source = cause.source();
        }
        std::process::exit(1);
    }
}
