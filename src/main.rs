//! # robot-folders CLI
//!
//! This is the binary entry point for the `robot-folders` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Returning a non-zero exit status on any error, including partially
//!   failed reconciliations.
//!
//! The reconciliation logic lives in the `robot_folders` library crate; the
//! binary only wires it to the terminal.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
