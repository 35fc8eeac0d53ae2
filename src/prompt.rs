//! # Interactive Decisions
//!
//! The inspector and the engine sometimes need a human decision: which remote
//! of a multi-remote checkout to record, which version or URL to keep, or
//! whether to delete a checkout that is no longer declared. Those decisions
//! go through the `Decider` trait so that the core logic never touches the
//! terminal itself.
//!
//! - `TerminalDecider` prompts with `dialoguer`.
//! - `NonInteractive` answers with the preselected default and fails when no
//!   default exists.
//! - `PromptResolver` turns any `Decider` into a `ConflictResolver` for the
//!   engine.

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use log::info;

use crate::error::{Error, Result};
use crate::policy::{Choice, Conflict, ConflictResolver};
use crate::vcs::Remote;

/// Supplies decisions that cannot be derived from configuration.
pub trait Decider {
    /// Picks one of the remotes of `checkout`, returning its index.
    fn choose_remote(&mut self, checkout: &Path, options: &[Remote], default: Option<usize>) -> Result<usize>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Picks one of `options`, returning its index.
    fn choose(&mut self, prompt: &str, options: &[String], default: usize) -> Result<usize>;
}

/// Prompts on the terminal.
pub struct TerminalDecider {
    theme: ColorfulTheme,
}

impl TerminalDecider {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalDecider {
    fn default() -> Self {
        Self::new()
    }
}

impl Decider for TerminalDecider {
    fn choose_remote(&mut self, checkout: &Path, options: &[Remote], default: Option<usize>) -> Result<usize> {
        let items: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(index, remote)| format!("{}: {} ({})", index, remote.name, remote.url))
            .collect();

        let mut select = Select::with_theme(&self.theme)
            .with_prompt(format!(
                "Found multiple remotes for repo {}. Which one do you want to use?",
                checkout.display()
            ))
            .items(items.as_slice());
        if let Some(default) = default {
            select = select.default(default);
        }

        let choice = select.interact()?;
        info!(
            "Selected remote {} ({})",
            options[choice].name, options[choice].url
        );
        Ok(choice)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn choose(&mut self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(default)
            .interact()?)
    }
}

/// Answers every question with its default, for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Decider for NonInteractive {
    fn choose_remote(&mut self, checkout: &Path, options: &[Remote], default: Option<usize>) -> Result<usize> {
        default.ok_or_else(|| {
            let names: Vec<&str> = options.iter().map(|r| r.name.as_str()).collect();
            Error::configuration(
                checkout.display().to_string(),
                format!(
                    "multiple remotes ({}) and no upstream to choose from non-interactively",
                    names.join(", ")
                ),
            )
        })
    }

    fn confirm(&mut self, _prompt: &str, default: bool) -> Result<bool> {
        Ok(default)
    }

    fn choose(&mut self, _prompt: &str, _options: &[String], default: usize) -> Result<usize> {
        Ok(default)
    }
}

/// Resolves engine conflicts by asking a `Decider`.
pub struct PromptResolver<'d> {
    decider: &'d mut dyn Decider,
}

impl<'d> PromptResolver<'d> {
    pub fn new(decider: &'d mut dyn Decider) -> Self {
        Self { decider }
    }
}

fn index_of(choice: Choice) -> usize {
    match choice {
        Choice::KeepLocal => 0,
        Choice::TakeDeclared => 1,
    }
}

impl ConflictResolver for PromptResolver<'_> {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Choice> {
        let default = conflict.default_choice();

        let (prompt, local, declared) = match *conflict {
            Conflict::Orphan { name } => {
                let delete = self.decider.confirm(
                    &format!(
                        "Package '{}' found locally, but not in target config. Do you want to delete it?",
                        name
                    ),
                    default == Choice::TakeDeclared,
                )?;
                return Ok(if delete {
                    Choice::TakeDeclared
                } else {
                    Choice::KeepLocal
                });
            }
            Conflict::Version { name, local, declared } => (
                format!("Package '{}' version differs. Which version should be used?", name),
                local,
                declared,
            ),
            Conflict::Url { name, local, declared } => (
                format!("Package '{}' url differs. Which url should be used?", name),
                local,
                declared,
            ),
        };

        let options = vec![
            format!("local version: {}", local),
            format!("config_file version: {}", declared),
        ];
        let answer = self.decider.choose(&prompt, &options, index_of(default))?;
        Ok(if answer == 1 {
            Choice::TakeDeclared
        } else {
            Choice::KeepLocal
        })
    }
}
