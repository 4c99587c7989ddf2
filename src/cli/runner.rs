//! CLI execution runner.
//!
//! One-shot helpers shared by the REPL and the `-e` path.

use std::path::Path;

use anyhow::Result;

use crate::session::{RunOutcome, UploadOutcome};

use super::bootstrap::CliContext;
use super::output;

/// Upload a workbook file and report the outcome.
///
/// Returns an error only in one-shot mode semantics: a rejected upload is
/// reported and surfaced so the caller can decide whether to abort.
pub async fn upload_workbook(ctx: &CliContext, path: &Path) -> Result<UploadOutcome> {
    let outcome = ctx.session.upload(path).await;
    output::print_upload(&outcome, ctx.args.json, ctx.args.quiet);
    Ok(outcome)
}

/// Execute a single query (with optional refinement) and exit-style
/// report: non-success becomes an error for the process exit code.
pub async fn execute_once(ctx: &CliContext, query: &str, refine: Option<&str>) -> Result<()> {
    ctx.session.set_query(query);
    if let Some(refine) = refine {
        ctx.session.set_refine(refine);
    }

    let outcome = ctx.session.run().await;
    output::print_run(&ctx.session.snapshot(), outcome, ctx.args.json, ctx.args.quiet);

    match outcome {
        RunOutcome::Succeeded => Ok(()),
        RunOutcome::Skipped => anyhow::bail!("Nothing to run: the query is empty"),
        RunOutcome::Superseded => anyhow::bail!("Run was superseded"),
        RunOutcome::Failed => {
            let snapshot = ctx.session.snapshot();
            anyhow::bail!(
                "{}",
                snapshot.error.unwrap_or_else(|| "Engine error".to_string())
            )
        }
    }
}

/// Run the session's current query, reporting but not failing on engine
/// errors (REPL mode: the session keeps going).
pub async fn execute_query(ctx: &CliContext) -> Result<()> {
    let outcome = ctx.session.run().await;
    output::print_run(&ctx.session.snapshot(), outcome, ctx.args.json, ctx.args.quiet);
    Ok(())
}
