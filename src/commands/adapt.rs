//! # Adapt Command Implementation
//!
//! This module implements the `adapt` subcommand, which brings a directory of
//! checkouts in line with a descriptor file.
//!
//! ## Process
//!
//! 1. **Scan**: Every checkout below the directory is inspected for its remote
//!    URL and version.
//! 2. **Plan**: The discovered state is compared with the descriptor file.
//!    Conflicts are settled by the override policy and orphaned checkouts by
//!    the delete policy, asking when a policy says `ask`.
//! 3. **Apply**: Clones, remote updates, checkouts and deletions run in plan
//!    order. A failing repository does not stop the others; the command still
//!    exits non-zero at the end.
//!
//! `--dry-run` stops after the plan. `--json` prints the plan as JSON.

use anyhow::{Context as _, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;

use robot_folders::adapter::WorkspaceAdapter;
use robot_folders::descriptor;
use robot_folders::engine::ReconciliationAction;
use robot_folders::output::{render_action, render_summary, OutputConfig};
use robot_folders::policy::{DeletePolicy, OverridePolicy, Policies};

use super::{decider, resolve_dir, Context};

/// Reconcile a directory of checkouts with a descriptor file
#[derive(Args, Debug)]
pub struct AdaptArgs {
    /// Descriptor file (.repos or .rosinstall)
    #[arg(value_name = "REPOS_FILE")]
    pub repos_file: PathBuf,

    /// Directory holding the checkouts (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// How to settle URL and version conflicts (ask, keep_local, override)
    #[arg(long, value_name = "POLICY", env = "ROBOT_FOLDERS_OVERRIDE_POLICY")]
    pub override_policy: Option<String>,

    /// What to do with undeclared checkouts (ask, keep_all, delete_all)
    #[arg(long, value_name = "POLICY", env = "ROBOT_FOLDERS_DELETE_POLICY")]
    pub delete_policy: Option<String>,

    /// Do not clone submodules
    #[arg(long)]
    pub no_submodules: bool,

    /// Also look for checkouts inside other checkouts
    #[arg(long)]
    pub nested: bool,

    /// Print the plan without applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; take the default of every decision
    #[arg(short, long)]
    pub yes: bool,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

impl AdaptArgs {
    /// Flag and environment values over the settings file.
    fn policies(&self, settings: Policies) -> Result<Policies> {
        let override_policy = match &self.override_policy {
            Some(value) => value.parse::<OverridePolicy>()?,
            None => settings.override_policy,
        };
        let delete_policy = match &self.delete_policy {
            Some(value) => value.parse::<DeletePolicy>()?,
            None => settings.delete_policy,
        };
        Ok(Policies::new(override_policy, delete_policy))
    }
}

/// Execute the `adapt` command.
pub fn execute(args: AdaptArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let policies = args.policies(settings.adapt.policies())?;
    let dir = resolve_dir(args.dir.as_deref())?;

    let declared = descriptor::from_file(&args.repos_file)
        .with_context(|| format!("Failed to read descriptor file {}", args.repos_file.display()))?;

    let adapter = WorkspaceAdapter::new(&dir)
        .clone_submodules(settings.adapt.clone_submodules && !args.no_submodules)
        .nested(settings.adapt.nested || args.nested);

    let mut decider = decider(args.yes);
    let actions = adapter.plan(&declared, policies, decider.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
    } else {
        print_plan(&ctx.output, &actions);
    }

    if args.dry_run {
        if !args.json {
            println!("🔍 Dry run, nothing was changed");
        }
        return Ok(());
    }

    apply(&adapter, &actions)?;
    if !args.json {
        println!("✅ {}", render_summary(&actions));
    }
    Ok(())
}

fn print_plan(output: &OutputConfig, actions: &[ReconciliationAction]) {
    if actions.is_empty() {
        println!("✅ {}", render_summary(actions));
        return;
    }
    println!("📋 Plan:");
    for action in actions {
        println!("  {}", render_action(output, action));
    }
}

fn apply(adapter: &WorkspaceAdapter, actions: &[ReconciliationAction]) -> Result<()> {
    let mutating = actions.iter().filter(|a| a.is_mutating()).count();
    if mutating == 0 {
        return Ok(());
    }

    let bar = ProgressBar::new(actions.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")?
            .progress_chars("=> "),
    );
    if !console::user_attended() {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }

    let result = adapter.apply_with_progress(actions, |index, action| {
        bar.set_position(index as u64);
        bar.set_message(action.to_string());
    });
    bar.finish_and_clear();

    result.context("Workspace was only partially adapted")
}
