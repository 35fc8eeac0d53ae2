//! # User Settings
//!
//! The optional settings file is TOML:
//!
//! ```toml
//! [build]
//! colcon_build_options = "--symlink-install"
//! cmake_flags = "-DCMAKE_EXPORT_COMPILE_COMMANDS=1"
//!
//! [adapt]
//! override_policy = "ask"
//! delete_policy = "ask"
//! clone_submodules = true
//! nested = false
//! ```
//!
//! Every key is optional. A missing file means all defaults. Command-line
//! flags and environment variables take precedence over the file; that
//! layering happens in the command layer.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_CMAKE_FLAGS, DEFAULT_COLCON_BUILD_OPTIONS};
use crate::error::{Error, Result};
use crate::policy::{DeletePolicy, OverridePolicy, Policies};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    pub colcon_build_options: String,
    pub cmake_flags: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            colcon_build_options: DEFAULT_COLCON_BUILD_OPTIONS.to_string(),
            cmake_flags: DEFAULT_CMAKE_FLAGS.to_string(),
        }
    }
}

impl BuildSettings {
    /// The arguments passed to `colcon build` when none are given explicitly.
    pub fn colcon_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .colcon_build_options
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let cmake: Vec<&str> = self.cmake_flags.split_whitespace().collect();
        if !cmake.is_empty() {
            args.push("--cmake-args".to_string());
            args.extend(cmake.into_iter().map(str::to_string));
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptSettings {
    pub override_policy: OverridePolicy,
    pub delete_policy: DeletePolicy,
    pub clone_submodules: bool,
    pub nested: bool,
}

impl Default for AdaptSettings {
    fn default() -> Self {
        Self {
            override_policy: OverridePolicy::default(),
            delete_policy: DeletePolicy::default(),
            clone_submodules: true,
            nested: false,
        }
    }
}

impl AdaptSettings {
    pub fn policies(&self) -> Policies {
        Policies::new(self.override_policy, self.delete_policy)
    }
}

/// The whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub build: BuildSettings,
    pub adapt: AdaptSettings,
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads settings from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        debug!("loading settings from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| Error::Settings {
            message: format!("{}: {}", path.display(), e),
        })
    }
}
