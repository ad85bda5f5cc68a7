use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livestream-scheduler")]
#[command(
    author,
    version,
    about = "Creates scheduled YouTube live broadcasts from time-stamped thumbnails"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create broadcasts for every thumbnail due within the creation window
    Run {
        /// Show what would be created without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Obtain and store an OAuth token (asks for consent if needed)
    Authorize,

    /// Show how thumbnail names would be scheduled right now
    Check {
        /// Thumbnail file names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
