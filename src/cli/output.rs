//! CLI output handling.
//!
//! Renders session snapshots, upload outcomes and template listings based
//! on output mode (terminal, JSON lines, or quiet).

use serde_json::json;

use crate::session::{RunOutcome, SessionSnapshot, UploadOutcome};
use crate::templates::Template;

/// Print the outcome of a run.
pub fn print_run(snapshot: &SessionSnapshot, outcome: RunOutcome, json_mode: bool, quiet_mode: bool) {
    if json_mode {
        let line = json!({
            "type": "run",
            "status": snapshot.status,
            "result": snapshot.result,
            "context": snapshot.context,
            "error": snapshot.error,
        });
        println!("{}", line);
        return;
    }

    match outcome {
        RunOutcome::Skipped => {
            eprintln!("Nothing to run: the query is empty or a run is already in flight.");
        }
        RunOutcome::Superseded => {
            eprintln!("Run superseded by a newer workbook or run.");
        }
        RunOutcome::Failed => {
            eprintln!(
                "Error: {}",
                snapshot.error.as_deref().unwrap_or("Engine error")
            );
        }
        RunOutcome::Succeeded => {
            if quiet_mode {
                // Quiet mode: only the result payload
                if let Some(result) = &snapshot.result {
                    println!("{}", pretty(result));
                }
                return;
            }
            if let Some(result) = &snapshot.result {
                println!("Result");
                println!("{}", pretty(result));
            }
            if let Some(context) = &snapshot.context {
                println!("Context");
                println!("{}", pretty(context));
            }
            if snapshot.result.is_none() && snapshot.context.is_none() {
                println!("Run succeeded with an empty payload.");
            }
        }
    }
}

/// Print the outcome of an upload.
pub fn print_upload(outcome: &UploadOutcome, json_mode: bool, quiet_mode: bool) {
    match outcome {
        UploadOutcome::Installed {
            sheet_names,
            signature,
            auto_applied,
        } => {
            if json_mode {
                let line = json!({
                    "type": "upload",
                    "ok": true,
                    "sheets": sheet_names,
                    "signature": signature,
                    "autoAppliedTemplate": auto_applied.as_ref().map(|t| t.id),
                });
                println!("{}", line);
                return;
            }
            if !quiet_mode {
                eprintln!("Detected sheets: {}", sheet_names.join(", "));
                if let Some(template) = auto_applied {
                    eprintln!("Applied saved template '{}'.", template.name);
                }
            }
        }
        UploadOutcome::Rejected { error } => {
            if json_mode {
                let line = json!({"type": "upload", "ok": false, "error": error});
                println!("{}", line);
            } else {
                eprintln!("Upload failed: {}", error);
            }
        }
    }
}

/// Print the template listing.
pub fn print_templates(templates: &[Template], json_mode: bool) {
    if json_mode {
        for template in templates {
            let line = json!({"type": "template", "template": template});
            println!("{}", line);
        }
        return;
    }

    if templates.is_empty() {
        eprintln!("No saved templates.");
        return;
    }

    for template in templates {
        let id = template.id.to_string();
        let mode = if template.auto_run { "auto-run" } else { "manual" };
        let signature = template.workbook_signature.as_deref().unwrap_or("-");
        println!(
            "{}  {:<20} [{}] {}",
            &id[..8],
            truncate(&template.name, 20),
            mode,
            signature
        );
        println!("          {}", truncate(&template.query, 70));
    }
}

/// Print the session status line.
pub fn print_status(snapshot: &SessionSnapshot, json_mode: bool) {
    if json_mode {
        let line = json!({"type": "status", "session": snapshot});
        println!("{}", line);
        return;
    }

    let workbook = if snapshot.sheet_names.is_empty() {
        "not uploaded yet".to_string()
    } else {
        format!("{} sheet(s)", snapshot.sheet_names.len())
    };
    println!("Status:   {}", snapshot.status);
    println!("Workbook: {}", workbook);
    if let Some(signature) = &snapshot.signature {
        println!("Signature: {}", signature);
    }
    println!("Query:    {} chars", snapshot.effective_query.len());
    if let Some(error) = &snapshot.error {
        println!("Error:    {}", error);
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Truncate a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(max_len.saturating_sub(1)).collect();
        result.push('…');
        result
    }
}
