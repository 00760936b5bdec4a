//! Interactive yes/no confirmation

use anyhow::Context;

pub trait Prompter {
    /// Ask `prompt`, returns `true` only on an explicit yes
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}

/// Asks on the controlling terminal, answering "no" by default
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("failed reading confirmation")
    }
}
