//! Interactive REPL for the sheetwiz CLI.
//!
//! Entered when no `-e` query is provided. Bare text sets the primary
//! query and runs it; slash commands drive everything else:
//! - `/open <path>` - Upload a workbook
//! - `/refine [text]` - Set (or clear) the refinement
//! - `/run` - Run the current query again
//! - `/save [name]` - Save the current query as an auto-run template
//! - `/templates` - List saved templates
//! - `/apply <id>` - Apply a template by id prefix
//! - `/auto <id>` - Toggle a template's auto-run flag
//! - `/rm <id>` - Remove a template
//! - `/status` - Show session status
//! - `/quit`, `/exit`, `/q` - Exit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use super::bootstrap::CliContext;
use super::output;
use super::runner::{execute_query, upload_workbook};

/// REPL command variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Exit the REPL
    Quit,
    /// Show command help
    Help,
    /// Upload a workbook file
    Open(PathBuf),
    /// Set the refinement text (empty clears it)
    Refine(String),
    /// Run the current query as-is
    Run,
    /// Save the current query as a template
    Save(String),
    /// List saved templates
    Templates,
    /// Apply a template by id prefix
    Apply(String),
    /// Toggle a template's auto-run flag by id prefix
    ToggleAuto(String),
    /// Remove a template by id prefix
    Remove(String),
    /// Show session status
    Status,
    /// Unknown command (will show help)
    Unknown(String),
    /// Set the primary query and run it
    Query(String),
    /// Empty input (skip)
    Empty,
}

impl ReplCommand {
    /// Parse user input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }

        if !trimmed.starts_with('/') {
            return ReplCommand::Query(trimmed.to_string());
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command.to_lowercase().as_str() {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" => ReplCommand::Help,
            "/open" if !rest.is_empty() => ReplCommand::Open(PathBuf::from(rest)),
            "/refine" => ReplCommand::Refine(rest.to_string()),
            "/run" => ReplCommand::Run,
            "/save" => ReplCommand::Save(rest.to_string()),
            "/templates" => ReplCommand::Templates,
            "/apply" if !rest.is_empty() => ReplCommand::Apply(rest.to_string()),
            "/auto" if !rest.is_empty() => ReplCommand::ToggleAuto(rest.to_string()),
            "/rm" if !rest.is_empty() => ReplCommand::Remove(rest.to_string()),
            "/status" => ReplCommand::Status,
            _ => ReplCommand::Unknown(trimmed.to_string()),
        }
    }
}

const HELP: &str = "\
Commands:
  /open <path>     Upload a workbook
  /refine [text]   Set the refinement (no text clears it)
  /run             Run the current query again
  /save [name]     Save the current query as an auto-run template
  /templates       List saved templates
  /apply <id>      Apply a template by id prefix
  /auto <id>       Toggle a template's auto-run flag
  /rm <id>         Remove a template
  /status          Show session status
  /quit            Exit
Anything else sets the query and runs it.";

/// Run an interactive REPL session.
///
/// Returns when the user exits or on EOF (Ctrl+D).
pub async fn run_repl(ctx: &CliContext) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    eprintln!("sheetwiz interactive mode");
    eprintln!("Type /help for commands, /quit to exit\n");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF (Ctrl+D)
            eprintln!("\nGoodbye!");
            break;
        }

        match ReplCommand::parse(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                eprintln!("Goodbye!");
                break;
            }
            ReplCommand::Help => eprintln!("{HELP}"),
            ReplCommand::Unknown(cmd) => {
                eprintln!("Unknown command: {}", cmd);
                eprintln!("{HELP}");
            }
            ReplCommand::Open(path) => {
                if let Err(e) = upload_workbook(ctx, &path).await {
                    eprintln!("Error: {}", e);
                }
            }
            ReplCommand::Refine(text) => {
                ctx.session.set_refine(text.as_str());
                if text.is_empty() {
                    eprintln!("Refinement cleared.");
                } else {
                    eprintln!("Refinement set.");
                }
            }
            ReplCommand::Run => {
                if let Err(e) = execute_query(ctx).await {
                    eprintln!("Error: {}", e);
                }
                println!();
            }
            ReplCommand::Save(name) => handle_save(ctx, &name),
            ReplCommand::Templates => {
                output::print_templates(&ctx.templates.all(), ctx.args.json);
            }
            ReplCommand::Apply(prefix) => match ctx.templates.find_by_prefix(&prefix) {
                Ok(template) => {
                    ctx.session.apply_template(&template);
                    eprintln!("Applied '{}'. Use /run to execute it.", template.name);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::ToggleAuto(prefix) => match ctx.templates.find_by_prefix(&prefix) {
                Ok(template) => {
                    ctx.templates.toggle_auto_run(template.id);
                    eprintln!("Toggled auto-run on '{}'.", template.name);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Remove(prefix) => match ctx.templates.find_by_prefix(&prefix) {
                Ok(template) => {
                    ctx.templates.remove(template.id);
                    eprintln!("Removed '{}'.", template.name);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Status => {
                output::print_status(&ctx.session.snapshot(), ctx.args.json);
            }
            ReplCommand::Query(text) => {
                ctx.session.set_query(text.as_str());
                if let Err(e) = execute_query(ctx).await {
                    eprintln!("Error: {}", e);
                }
                println!(); // Blank line between interactions
            }
        }
    }

    Ok(())
}

/// Save the current primary query as a template bound to the current
/// workbook's signature.
fn handle_save(ctx: &CliContext, name: &str) {
    let snapshot = ctx.session.snapshot();

    match ctx
        .templates
        .create(name, &snapshot.query, true, snapshot.signature)
    {
        Some(template) => eprintln!("Saved template '{}' ({}).", template.name, template.id),
        None => eprintln!("Nothing to save: the query is empty."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quit_commands() {
        assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/q"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/QUIT"), ReplCommand::Quit);
    }

    #[test]
    fn parses_open_with_path() {
        assert_eq!(
            ReplCommand::parse("/open data/book.xlsx"),
            ReplCommand::Open(PathBuf::from("data/book.xlsx"))
        );
    }

    #[test]
    fn open_without_path_is_unknown() {
        assert_eq!(
            ReplCommand::parse("/open"),
            ReplCommand::Unknown("/open".to_string())
        );
    }

    #[test]
    fn parses_refine_with_and_without_text() {
        assert_eq!(
            ReplCommand::parse("/refine Only Europe"),
            ReplCommand::Refine("Only Europe".to_string())
        );
        assert_eq!(ReplCommand::parse("/refine"), ReplCommand::Refine(String::new()));
    }

    #[test]
    fn parses_save_with_optional_name() {
        assert_eq!(
            ReplCommand::parse("/save Quarterly revenue"),
            ReplCommand::Save("Quarterly revenue".to_string())
        );
        assert_eq!(ReplCommand::parse("/save"), ReplCommand::Save(String::new()));
    }

    #[test]
    fn parses_run_command() {
        assert_eq!(ReplCommand::parse("/run"), ReplCommand::Run);
    }

    #[test]
    fn parses_template_management_commands() {
        assert_eq!(
            ReplCommand::parse("/apply 3fa8"),
            ReplCommand::Apply("3fa8".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/auto 3fa8"),
            ReplCommand::ToggleAuto("3fa8".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/rm 3fa8"),
            ReplCommand::Remove("3fa8".to_string())
        );
        assert_eq!(ReplCommand::parse("/templates"), ReplCommand::Templates);
    }

    #[test]
    fn bare_text_is_a_query() {
        assert_eq!(
            ReplCommand::parse("Show revenue by region"),
            ReplCommand::Query("Show revenue by region".to_string())
        );
    }

    #[test]
    fn unknown_slash_command() {
        assert_eq!(
            ReplCommand::parse("/frobnicate"),
            ReplCommand::Unknown("/frobnicate".to_string())
        );
    }

    #[test]
    fn empty_input_is_skipped() {
        assert_eq!(ReplCommand::parse(""), ReplCommand::Empty);
        assert_eq!(ReplCommand::parse("   \t"), ReplCommand::Empty);
    }
}
