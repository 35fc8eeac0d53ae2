//! # Build Command Implementation
//!
//! This module implements the `build` subcommand, which runs `colcon build` in
//! a workspace. The workspace's own `install/local_setup.bash` is sourced when
//! it exists, otherwise the selected ROS distribution. Other workspaces are
//! stripped from the environment first so that builds do not pick up stale
//! overlays.
//!
//! Arguments after `--` are passed to colcon instead of the configured
//! `colcon_build_options` and `cmake_flags`.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use robot_folders::defaults::DEFAULT_ROS_ROOT;
use robot_folders::ros;
use robot_folders::workspace::{ColconWorkspace, Workspace};

use super::{decider, Context};

/// Build a colcon workspace
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Workspace directory
    #[arg(value_name = "WORKSPACE")]
    pub workspace: PathBuf,

    /// ROS distribution to source if the workspace has not been built yet
    #[arg(long, value_name = "DISTRO", env = "ROBOT_FOLDERS_ROS_DISTRO")]
    pub ros_distro: Option<String>,

    /// Directory holding the installed ROS distributions
    #[arg(long, value_name = "DIR", env = "ROBOT_FOLDERS_ROS_ROOT", default_value = DEFAULT_ROS_ROOT)]
    pub ros_root: PathBuf,

    /// Never prompt; take the default of every decision
    #[arg(short, long)]
    pub yes: bool,

    /// Arguments passed to `colcon build`
    #[arg(last = true, value_name = "ARGS")]
    pub colcon_args: Vec<String>,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, ctx: &Context) -> Result<()> {
    if !args.workspace.join("src").is_dir() {
        bail!(
            "{} is not a workspace (no src directory). Create one with `robot-folders init`.",
            args.workspace.display()
        );
    }

    let settings = ctx.settings()?;
    let mut workspace = ColconWorkspace::new(&args.workspace)
        .with_ros_root(&args.ros_root)
        .with_build_settings(settings.build);

    let distro = match args.ros_distro {
        Some(distro) => Some(distro),
        None if args.workspace.join("install/local_setup.bash").exists() => None,
        None => {
            let installed = ros::installed_ros2_distros(&args.ros_root)?;
            if installed.is_empty() {
                None
            } else {
                let mut decider = decider(args.yes);
                Some(ros::select_distro(&installed, decider.as_mut())?)
            }
        }
    };
    if let Some(distro) = distro {
        workspace = workspace.with_ros_distro(distro);
    }

    println!("🔨 Building {}", args.workspace.display());
    workspace.build(&args.colcon_args)?;
    println!("✅ Build finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context_in;
    use tempfile::TempDir;

    #[test]
    fn test_execute_rejects_non_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let args = BuildArgs {
            workspace: temp_dir.path().join("missing_ws"),
            ros_distro: None,
            ros_root: temp_dir.path().join("no-ros"),
            yes: true,
            colcon_args: Vec::new(),
        };

        let result = execute(args, &context_in(temp_dir.path()));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("is not a workspace"));
    }
}
