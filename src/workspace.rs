//! # Workspaces
//!
//! A workspace is a directory with a `src` directory of checkouts and the
//! tooling to build and source it. The `Workspace` trait describes what the
//! command layer needs from one. Reconciliation of `src` goes through the
//! [`WorkspaceAdapter`] returned by [`Workspace::adapter`].
//!
//! `ColconWorkspace` is the ROS 2 implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, error, info};

use crate::adapter::WorkspaceAdapter;
use crate::defaults::{DEFAULT_ROS_ROOT, SOURCE_DIR_NAME};
use crate::descriptor::DescriptorSet;
use crate::engine::ReconciliationAction;
use crate::environment::{self, source_bash, strip_workspace_from_env, Environment};
use crate::error::{Error, Result};
use crate::settings::BuildSettings;

pub trait Workspace {
    /// The workspace directory.
    fn root(&self) -> &Path;

    /// The directory holding the checkouts.
    fn source_directory(&self) -> PathBuf {
        self.root().join(SOURCE_DIR_NAME)
    }

    /// Creates the directory layout. Fails if the workspace already exists.
    fn create_skeleton(&self) -> Result<()>;

    /// Returns `current_env` with the workspace (or its underlay) sourced.
    fn source(&self, current_env: &Environment) -> Result<Environment>;

    /// Builds the workspace. Empty `extra_args` means the configured defaults.
    fn build(&self, extra_args: &[String]) -> Result<()>;

    /// The adapter that reconciles the source directory.
    fn adapter(&self) -> WorkspaceAdapter {
        WorkspaceAdapter::new(self.source_directory())
    }

    /// Creates the skeleton and clones `repos` into it.
    fn create(&self, repos: Option<&DescriptorSet>, clone_submodules: bool) -> Result<Vec<ReconciliationAction>> {
        self.create_skeleton()?;
        match repos {
            Some(repos) => self.adapter().clone_submodules(clone_submodules).clone_all(repos),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(unix)]
fn link_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn link_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

/// A ROS 2 workspace built with colcon.
#[derive(Debug, Clone)]
pub struct ColconWorkspace {
    ws_directory: PathBuf,
    build_directory: PathBuf,
    ros_distro: Option<String>,
    ros_root: PathBuf,
    build_settings: BuildSettings,
    colcon: PathBuf,
}

impl ColconWorkspace {
    /// A workspace at `ws_directory` that builds into `ws_directory/build`.
    pub fn new(ws_directory: impl Into<PathBuf>) -> Self {
        let ws_directory = ws_directory.into();
        Self {
            build_directory: ws_directory.join("build"),
            ws_directory,
            ros_distro: None,
            ros_root: PathBuf::from(DEFAULT_ROS_ROOT),
            build_settings: BuildSettings::default(),
            colcon: PathBuf::from("colcon"),
        }
    }

    /// Builds somewhere else, e.g. on a disk without backup.
    pub fn with_build_directory(mut self, build_directory: impl Into<PathBuf>) -> Self {
        self.build_directory = build_directory.into();
        self
    }

    /// The underlay distribution sourced before the first build.
    pub fn with_ros_distro(mut self, distro: impl Into<String>) -> Self {
        self.ros_distro = Some(distro.into());
        self
    }

    pub fn with_ros_root(mut self, ros_root: impl Into<PathBuf>) -> Self {
        self.ros_root = ros_root.into();
        self
    }

    pub fn with_build_settings(mut self, build_settings: BuildSettings) -> Self {
        self.build_settings = build_settings;
        self
    }

    /// Uses a different colcon executable.
    pub fn with_colcon_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.colcon = program.into();
        self
    }

    pub fn build_directory(&self) -> &Path {
        &self.build_directory
    }

    fn mkdir(path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                Error::configuration(path.display().to_string(), "directory already exists")
            }
            _ => Error::Io(e),
        })
    }
}

impl Workspace for ColconWorkspace {
    fn root(&self) -> &Path {
        &self.ws_directory
    }

    fn create_skeleton(&self) -> Result<()> {
        if let Some(parent) = self.ws_directory.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::mkdir(&self.ws_directory)?;
        Self::mkdir(&self.source_directory())?;
        fs::create_dir_all(&self.build_directory)?;

        let local_build = self.ws_directory.join("build");
        if local_build == self.build_directory {
            return Ok(());
        }

        // build, log and install live next to each other in the build location
        let base = self.build_directory.parent().unwrap_or(&self.build_directory);
        link_dir(&self.build_directory, &local_build)?;
        for name in ["log", "install"] {
            let target = base.join(name);
            info!("{}_dir: {}", name, target.display());
            fs::create_dir_all(&target)?;
            link_dir(&target, &self.ws_directory.join(name))?;
        }
        Ok(())
    }

    fn source(&self, current_env: &Environment) -> Result<Environment> {
        let local_setup = self.ws_directory.join("install").join("local_setup.bash");
        if local_setup.exists() {
            return source_bash(&local_setup, current_env);
        }

        let distro = self.ros_distro.as_deref().ok_or_else(|| Error::Environment {
            message: format!(
                "workspace {} has not been built and no ROS distribution is selected",
                self.ws_directory.display()
            ),
        })?;
        source_bash(&self.ros_root.join(distro).join("setup.bash"), current_env)
    }

    fn build(&self, extra_args: &[String]) -> Result<()> {
        info!("Building colcon_ws in {}", self.ws_directory.display());

        let args = if extra_args.is_empty() {
            self.build_settings.colcon_args()
        } else {
            extra_args.to_vec()
        };
        let command_line = format!("{} build {}", self.colcon.display(), args.join(" "));
        let current = environment::current();
        let sourced = self.source(&current).unwrap_or_else(|e| {
            debug!("building without sourcing: {}", e);
            current
        });
        let env = strip_workspace_from_env(&sourced, &self.ws_directory)?;

        let status = Command::new(&self.colcon)
            .arg("build")
            .args(&args)
            .current_dir(&self.ws_directory)
            .env_clear()
            .envs(&env)
            .status()
            .map_err(|e| {
                error!("Failed to run {}: {}", self.colcon.display(), e);
                Error::Build {
                    command: command_line.clone(),
                    status: None,
                }
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Build {
                command: command_line,
                status: status.code(),
            })
        }
    }
}
