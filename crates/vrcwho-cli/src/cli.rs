//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// VRChat instance presence analyzer.
///
/// Parses a VRChat client log file and reports, per world instance, which
/// users were present during a time window: join counts, join/leave times,
/// and total playtime.
#[derive(Debug, Parser)]
#[command(name = "vrcwho", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a log file over a time window.
    Analyze {
        /// Path to the VRChat output log file.
        file: PathBuf,

        /// Window start (inclusive), e.g. "2025-08-31 04:00:00".
        #[arg(long)]
        start: String,

        /// Window end (exclusive), e.g. "2025-08-31 06:00:00".
        #[arg(long)]
        end: String,

        /// Output the report as JSON.
        #[arg(long)]
        json: bool,
    },
}
