//! Interactive confirmation for fix mode
//!
//! Uses dialoguer for the terminal prompt.

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::Confirm;

use crate::error::Result;

/// Terminal-backed answer to the synchronizer's confirmation gates.
///
/// Without an interactive terminal every question is declined, so a
/// non-CI run never modifies the tree unattended.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl protosync_core::Confirm for TerminalConfirm {
    fn confirm(&self, question: &str) -> bool {
        match ask(question) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed; declining");
                false
            }
        }
    }
}

/// Print the question's context and ask its final line as a yes/no prompt.
fn ask(question: &str) -> Result<bool> {
    let (context, prompt) = split_question(question);
    if !context.is_empty() {
        eprintln!("{}", context.yellow());
    }

    if !std::io::stdin().is_terminal() {
        eprintln!("{} {prompt} (no terminal; pass --ci to confirm automatically)", "!".red().bold());
        return Ok(false);
    }

    let answer = Confirm::new().with_prompt(prompt).default(false).interact()?;
    Ok(answer)
}

/// Split a multi-line question into its context and its last line.
fn split_question(question: &str) -> (&str, &str) {
    match question.trim_end().rsplit_once('\n') {
        Some((context, prompt)) => (context, prompt),
        None => ("", question.trim_end()),
    }
}
