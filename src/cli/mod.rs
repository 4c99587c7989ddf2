//! Command-line interface for the sheetwiz client.
//!
//! One-shot mode uploads a workbook and runs a single query; without `-e`
//! the binary drops into an interactive REPL.

mod args;
mod bootstrap;
mod output;
mod repl;
mod runner;

pub use args::Args;
pub use bootstrap::{initialize, CliContext};
pub use repl::{run_repl, ReplCommand};
pub use runner::{execute_once, upload_workbook};
