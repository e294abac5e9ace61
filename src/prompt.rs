//! Operator confirmation prompts.
//!
//! The orchestrators never talk to the terminal directly; they ask a
//! [`Prompter`]. The interactive implementation refuses to prompt when stdin
//! is not a terminal and treats that as "no".

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use crate::output::Output;

pub trait Prompter: Send + Sync {
    /// Ask a yes/no question. `Ok(false)` means the operator declined.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompts on the controlling terminal via cliclack.
pub struct InteractivePrompter;

impl Prompter for InteractivePrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        if !std::io::stdin().is_terminal() {
            Output::warning("Non-interactive mode detected; use --confirm to skip prompts.");
            return Ok(false);
        }

        cliclack::confirm(question)
            .initial_value(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Answers every question with a fixed value.
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm(&self, question: &str) -> Result<bool> {
        tracing::debug!(question, answer = self.0, "auto-answering prompt");
        Ok(self.0)
    }
}
