//! Torrentslicer CLI - Command-line interface
//!
//! Reads `.torrent` files from disk and prints their metadata report.

mod commands;
mod config;
mod tracing_setup;

use std::path::PathBuf;

use clap::Parser;
use tracing_setup::CliLogLevel;

#[derive(Parser)]
#[command(name = "torrentslicer")]
#[command(about = "Extract and analyze metadata from BitTorrent files")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Also write trace-level logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Largest torrent file accepted, in bytes
    #[arg(long, global = true)]
    max_input_bytes: Option<usize>,

    /// Deepest list/dictionary nesting accepted
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Report the true size of the final piece instead of the legacy value
    #[arg(long, global = true)]
    remainder_last_piece: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.log_level.as_tracing_level(), cli.log_file.as_deref())?;

    let config = config::resolve_config(&config::CliOverrides {
        max_input_bytes: cli.max_input_bytes,
        max_depth: cli.max_depth,
        remainder_last_piece: cli.remainder_last_piece,
    })?;
    commands::handle_command(cli.command, config)
}
