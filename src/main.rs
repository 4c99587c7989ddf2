//! Sheetwiz - session client for a workbook-analysis engine
//!
//! # Usage
//!
//! ```bash
//! # Upload a workbook and run a single query
//! sheetwiz book.xlsx -e "Total revenue by region"
//!
//! # Refine without rewriting the query
//! sheetwiz book.xlsx -e "Total revenue by region" -r "Only Europe"
//!
//! # JSON output for scripting
//! sheetwiz book.xlsx -e "Total revenue" --json | jq .
//!
//! # Interactive REPL mode (when no -e is provided)
//! sheetwiz book.xlsx
//! ```

use anyhow::Result;
use clap::Parser;

use sheetwiz::cli::{execute_once, initialize, run_repl, upload_workbook, Args};
use sheetwiz::UploadOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let ctx = initialize(&args).await?;

    // Upload the workbook first, if one was given
    if let Some(ref path) = args.workbook {
        let outcome = upload_workbook(&ctx, path).await?;
        if args.execute.is_some() {
            // One-shot mode: a rejected upload aborts the run
            if let UploadOutcome::Rejected { error } = outcome {
                anyhow::bail!("{error}");
            }
        }
    }

    if let Some(ref query) = args.execute {
        execute_once(&ctx, query, args.refine.as_deref()).await
    } else {
        run_repl(&ctx).await
    }
}
