//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Track torrent downloads through completion, finalization and seeding.
#[derive(Parser)]
#[command(name = "autoget")]
#[command(about = "Reconcile Transmission downloads with a local record store")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "AUTOGET_CONFIG",
        default_value = "autoget.json"
    )]
    pub config: PathBuf,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
