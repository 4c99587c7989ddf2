//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for the sheetwiz binary.

use clap::Parser;
use std::path::PathBuf;

/// Sheetwiz - session client for a workbook-analysis engine
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetwiz")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Workbook file to upload at startup
    pub workbook: Option<PathBuf>,

    /// Execute a single query and exit
    #[arg(short = 'e', long)]
    pub execute: Option<String>,

    /// Refinement appended to the query (one-shot mode only)
    #[arg(short = 'r', long, requires = "execute")]
    pub refine: Option<String>,

    /// Override the engine base URL from settings
    #[arg(long, env = "SHEETWIZ_ENGINE_URL")]
    pub engine_url: Option<String>,

    /// Output results as JSON lines (for scripting/parsing)
    #[arg(long)]
    pub json: bool,

    /// Only output the final result payload
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
