//! # Scrape Command Implementation
//!
//! This module implements the `scrape` subcommand, which writes the checkouts
//! of a directory as a descriptor file. The result can be fed back into
//! `adapt` or `init --repos` to reproduce the directory elsewhere.
//!
//! By default a checkout on a branch is recorded with the branch name. With
//! `--exact` every checkout is pinned to its current commit.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use robot_folders::adapter::WorkspaceAdapter;

use super::{decider, resolve_dir, Context};

/// Write the checkouts of a directory as a descriptor file
#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Directory holding the checkouts (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Record commit hashes instead of branch names
    #[arg(long)]
    pub exact: bool,

    /// Also look for checkouts inside other checkouts
    #[arg(long)]
    pub nested: bool,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Never prompt; take the default of every decision
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `scrape` command.
pub fn execute(args: ScrapeArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let dir = resolve_dir(args.dir.as_deref())?;

    let adapter = WorkspaceAdapter::new(&dir).nested(settings.adapt.nested || args.nested);
    let mut decider = decider(args.yes);
    let repos = adapter
        .scrape(args.exact, decider.as_mut())
        .with_context(|| format!("Failed to scrape {}", dir.display()))?;

    match &args.output {
        Some(path) => {
            repos.write_to_file(path)?;
            eprintln!(
                "✅ Wrote {} repositor{} to {}",
                repos.len(),
                if repos.len() == 1 { "y" } else { "ies" },
                path.display()
            );
        }
        None => print!("{}", repos.to_yaml()?),
    }

    Ok(())
}
