//! nodeforge CLI - Build and cache native addons written in Rust

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use nodeforge::core::BuildError;
use nodeforge::util::Shell;

fn main() {
    if let Err(e) = run() {
        report(e);
        std::process::exit(1);
    }
}

/// Print a failure to stderr. Build errors go through miette so their
/// code and remediation help are shown alongside the message.
fn report(err: anyhow::Error) {
    match err.downcast::<BuildError>() {
        Ok(diagnostic) => eprintln!("{:?}", miette::Report::new(diagnostic)),
        Err(err) => eprintln!("error: {:#}", err),
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("nodeforge=debug")
    } else {
        EnvFilter::new("nodeforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Clean(args) => commands::clean::execute(args, shell),
    }
}
