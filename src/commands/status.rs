//! # Status Command Implementation
//!
//! This module implements the `status` subcommand, which lists the checkouts
//! of a directory with their remote URL and version, and the checkouts that
//! could not be inspected.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use robot_folders::adapter::WorkspaceAdapter;
use robot_folders::inspector::Scan;
use robot_folders::output::{emoji, OutputConfig};

use super::{decider, resolve_dir, Context};

/// Show the checkouts of a directory
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Directory holding the checkouts (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Show commit hashes instead of branch names
    #[arg(long)]
    pub exact: bool,

    /// Also look for checkouts inside other checkouts
    #[arg(long)]
    pub nested: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    /// Never prompt; take the default of every decision
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `status` command.
///
/// Checkouts that fail inspection are listed but do not fail the command.
pub fn execute(args: StatusArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let dir = resolve_dir(args.dir.as_deref())?;

    let adapter = WorkspaceAdapter::new(&dir).nested(settings.adapt.nested || args.nested);
    let mut decider = decider(args.yes);
    let scan = adapter.scan(args.exact, decider.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&scan))?);
    } else {
        print!("{}", render(&ctx.output, &scan));
    }
    Ok(())
}

fn to_json(scan: &Scan) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = scan
        .failures
        .iter()
        .map(|f| serde_json::json!({ "path": f.path, "error": f.error.to_string() }))
        .collect();
    serde_json::json!({
        "repositories": scan.repositories.values().collect::<Vec<_>>(),
        "failures": failures,
    })
}

fn render(output: &OutputConfig, scan: &Scan) -> String {
    if scan.repositories.is_empty() && scan.failures.is_empty() {
        return "No checkouts found\n".to_string();
    }

    let width = scan
        .repositories
        .keys()
        .chain(scan.failures.iter().map(|f| &f.path))
        .map(String::len)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for state in scan.repositories.values() {
        let version = if output.use_color {
            style(&state.version).cyan().to_string()
        } else {
            state.version.clone()
        };
        out.push_str(&format!(
            "{:width$}  {}  {}\n",
            state.path,
            version,
            state.url,
            width = width
        ));
    }
    for failure in &scan.failures {
        out.push_str(&format!(
            "{:width$}  {} {}\n",
            failure.path,
            emoji(output, "⚠️", "[ERROR]"),
            failure.error,
            width = width
        ));
    }
    out
}
