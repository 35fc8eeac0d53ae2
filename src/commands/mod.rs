//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `robot-folders` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `robot_folders` library.
//!
//! Option values are layered: an explicit flag wins over its
//! `ROBOT_FOLDERS_*` environment variable (both handled by clap), which wins
//! over the settings file, which wins over the built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use robot_folders::output::OutputConfig;
use robot_folders::prompt::{Decider, NonInteractive, TerminalDecider};
use robot_folders::settings::Settings;

pub mod adapt;
pub mod build;
pub mod completions;
pub mod init;
pub mod scrape;
pub mod status;

/// State shared by every command, derived from the global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputConfig,
    pub settings_path: PathBuf,
}

impl Context {
    /// Loads the settings file named by `--settings` or the default location.
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings::load(&self.settings_path)?)
    }
}

/// Prompts on the terminal when someone is there to answer, otherwise takes
/// the default of every decision.
pub fn decider(assume_yes: bool) -> Box<dyn Decider> {
    if !assume_yes && console::user_attended() {
        Box::new(TerminalDecider::new())
    } else {
        Box::new(NonInteractive)
    }
}

/// Resolves an optional directory argument, defaulting to the current directory.
pub fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}
