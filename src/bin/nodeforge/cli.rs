//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nodeforge::util::shell::ColorChoice;

/// nodeforge - Build and cache native addons written in Rust
#[derive(Parser)]
#[command(name = "nodeforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the native crate and install the addon
    Build(BuildArgs),

    /// Remove build artifacts and the installed addon
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// rustup toolchain to build with (e.g. "stable", "nightly")
    #[arg(long)]
    pub toolchain: Option<String>,

    /// Architecture to build for (defaults to npm_config_arch or the host)
    #[arg(long)]
    pub arch: Option<String>,

    /// Project directory (defaults to the nearest directory with a package.json)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Extra arguments passed to `cargo build`
    #[arg(last = true)]
    pub cargo_args: Vec<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Project directory (defaults to the nearest directory with a package.json)
    #[arg(long)]
    pub path: Option<PathBuf>,
}
