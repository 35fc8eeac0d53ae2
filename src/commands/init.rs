//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which creates a colcon
//! workspace and optionally clones a descriptor file's repositories into its
//! `src` directory.
//!
//! ## Functionality
//!
//! - **Skeleton**: Creates `<WORKSPACE>/src` and the build directory. With
//!   `--build-dir`, `build`, `log` and `install` are symlinks into that location.
//! - **Underlay**: Selects the ROS distribution to source for the first build,
//!   asking when several are installed.
//! - **Clone**: Clones every valid repository of `--repos`. Invalid entries are
//!   reported and skipped.

use anyhow::{Context as _, Result};
use clap::Args;
use log::warn;
use std::path::PathBuf;

use robot_folders::defaults::DEFAULT_ROS_ROOT;
use robot_folders::descriptor;
use robot_folders::output::{render_action, render_summary};
use robot_folders::ros;
use robot_folders::workspace::{ColconWorkspace, Workspace};

use super::{decider, Context};

/// Create a colcon workspace
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory of the new workspace (must not exist)
    #[arg(value_name = "WORKSPACE")]
    pub workspace: PathBuf,

    /// Descriptor file whose repositories are cloned into src
    #[arg(short, long, value_name = "FILE")]
    pub repos: Option<PathBuf>,

    /// Put build, log and install somewhere else and symlink them
    #[arg(long, value_name = "DIR", env = "ROBOT_FOLDERS_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// ROS distribution to use as underlay (default: ask, newest preselected)
    #[arg(long, value_name = "DISTRO", env = "ROBOT_FOLDERS_ROS_DISTRO")]
    pub ros_distro: Option<String>,

    /// Directory holding the installed ROS distributions
    #[arg(long, value_name = "DIR", env = "ROBOT_FOLDERS_ROS_ROOT", default_value = DEFAULT_ROS_ROOT)]
    pub ros_root: PathBuf,

    /// Do not clone submodules
    #[arg(long)]
    pub no_submodules: bool,

    /// Never prompt; take the default of every decision
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut decider = decider(args.yes);

    // parse before touching the filesystem so a broken file leaves nothing behind
    let repos = args
        .repos
        .as_ref()
        .map(|path| {
            descriptor::from_file(path)
                .with_context(|| format!("Failed to read descriptor file {}", path.display()))
        })
        .transpose()?;

    let mut workspace = ColconWorkspace::new(&args.workspace)
        .with_ros_root(&args.ros_root)
        .with_build_settings(settings.build);
    if let Some(build_dir) = &args.build_dir {
        workspace = workspace.with_build_directory(build_dir);
    }

    let distro = match args.ros_distro {
        Some(distro) => Some(distro),
        None => {
            let installed = ros::installed_ros2_distros(&args.ros_root)?;
            if installed.is_empty() {
                let ros1 = ros::installed_ros1_distros(&args.ros_root)?;
                if ros1.is_empty() {
                    warn!(
                        "No ROS 2 distribution found in {}, the workspace will have no underlay",
                        args.ros_root.display()
                    );
                } else {
                    warn!(
                        "Only ROS 1 distributions ({}) found in {}, colcon workspaces need ROS 2; the workspace will have no underlay",
                        ros1.join(", "),
                        args.ros_root.display()
                    );
                }
                None
            } else {
                Some(ros::select_distro(&installed, decider.as_mut())?)
            }
        }
    };
    if let Some(distro) = distro {
        workspace = workspace.with_ros_distro(distro);
    }

    println!("🎯 Creating workspace {}", args.workspace.display());
    let clone_submodules = settings.adapt.clone_submodules && !args.no_submodules;
    let actions = workspace.create(repos.as_ref(), clone_submodules)?;

    for action in &actions {
        println!("  {}", render_action(&ctx.output, action));
    }
    println!("✅ {}", render_summary(&actions));
    println!(
        "💡 Run `robot-folders build {}` to build it",
        args.workspace.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context_in;
    use std::fs;
    use tempfile::TempDir;

    fn args(workspace: PathBuf, ros_root: PathBuf) -> InitArgs {
        InitArgs {
            workspace,
            repos: None,
            build_dir: None,
            ros_distro: None,
            ros_root,
            no_submodules: false,
            yes: true,
        }
    }

    #[test]
    fn test_execute_creates_skeleton_without_underlay() {
        let temp_dir = TempDir::new().unwrap();
        let ws = temp_dir.path().join("colcon_ws");

        let result = execute(
            args(ws.clone(), temp_dir.path().join("no-ros")),
            &context_in(temp_dir.path()),
        );

        assert!(result.is_ok(), "{:?}", result);
        assert!(ws.join("src").is_dir());
        assert!(ws.join("build").is_dir());
    }

    #[test]
    fn test_execute_with_only_ros1_installed_has_no_underlay() {
        let temp_dir = TempDir::new().unwrap();
        let ros_root = temp_dir.path().join("opt/ros");
        fs::create_dir_all(ros_root.join("noetic")).unwrap();
        fs::write(
            ros_root.join("noetic/setup.sh"),
            "# generated from catkin/cmake/template/setup.sh.in\n",
        )
        .unwrap();
        let ws = temp_dir.path().join("colcon_ws");

        let result = execute(args(ws.clone(), ros_root), &context_in(temp_dir.path()));

        assert!(result.is_ok(), "{:?}", result);
        assert!(ws.join("src").is_dir());
    }

    #[test]
    fn test_execute_fails_for_existing_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let ws = temp_dir.path().join("colcon_ws");
        fs::create_dir_all(&ws).unwrap();

        let mut init = args(ws, temp_dir.path().join("no-ros"));
        init.ros_distro = Some("jazzy".to_string());
        let result = execute(init, &context_in(temp_dir.path()));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[test]
    fn test_execute_rejects_broken_descriptor_before_creating() {
        let temp_dir = TempDir::new().unwrap();
        let ws = temp_dir.path().join("colcon_ws");
        let repos = temp_dir.path().join("broken.repos");
        fs::write(&repos, "repositories: [unclosed").unwrap();

        let mut init = args(ws.clone(), temp_dir.path().join("no-ros"));
        init.repos = Some(repos);
        let result = execute(init, &context_in(temp_dir.path()));

        assert!(result.is_err());
        assert!(!ws.exists());
    }

    #[test]
    fn test_execute_skips_invalid_entries() {
        let temp_dir = TempDir::new().unwrap();
        let ws = temp_dir.path().join("colcon_ws");
        let repos = temp_dir.path().join("ws.repos");
        fs::write(
            &repos,
            "repositories:\n  legacy:\n    type: svn\n    url: https://svn.example.com/legacy\n",
        )
        .unwrap();

        let mut init = args(ws.clone(), temp_dir.path().join("no-ros"));
        init.repos = Some(repos);
        let result = execute(init, &context_in(temp_dir.path()));

        assert!(result.is_ok(), "{:?}", result);
        assert!(!ws.join("src/legacy").exists());
    }
}
