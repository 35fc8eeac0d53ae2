//! Process environments for sourcing and building workspaces.
//!
//! `source_bash` runs a bash script with `set -a` and captures the exported
//! environment afterwards, which is how ROS `setup.bash` and colcon
//! `local_setup.bash` scripts are consumed.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

/// Environment variables by name.
pub type Environment = BTreeMap<String, String>;

/// The environment of the current process.
///
/// Variables that are not valid unicode are left out.
pub fn current() -> Environment {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Parses `env -0` output.
fn parse_env_output(output: &[u8]) -> Environment {
    output
        .split(|byte| *byte == 0)
        .filter_map(|entry| {
            let entry = String::from_utf8_lossy(entry);
            let (key, value) = entry.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Sources `source_file` in bash, starting from `current_env`, and returns the
/// resulting environment.
pub fn source_bash(source_file: &Path, current_env: &Environment) -> Result<Environment> {
    if !source_file.exists() {
        return Err(Error::Environment {
            message: format!("Source file '{}' does not exist.", source_file.display()),
        });
    }

    debug!("sourcing {}", source_file.display());
    let output = Command::new("bash")
        .arg("-c")
        .arg(r#"set -a; source "$1" > /dev/null; env -0"#)
        .arg("bash")
        .arg(source_file)
        .env_clear()
        .envs(current_env)
        .output()
        .map_err(|e| Error::Environment {
            message: format!("failed to run bash: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::Environment {
            message: format!(
                "sourcing '{}' failed: {}",
                source_file.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(parse_env_output(&output.stdout))
}

/// Removes every path segment that starts with `workspace` from every value.
///
/// colcon must not build with the workspace's own overlay sourced.
pub fn strip_workspace_from_env(env: &Environment, workspace: &Path) -> Result<Environment> {
    let workspace = workspace.to_string_lossy();
    let pattern = Regex::new(&format!("{}[^:]*", regex::escape(&workspace)))?;

    Ok(env
        .iter()
        .map(|(key, value)| {
            let value = if value.contains(&*workspace) {
                pattern.replace_all(value, "").into_owned()
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect())
}
