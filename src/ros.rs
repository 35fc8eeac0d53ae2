//! Detection of installed ROS distributions.
//!
//! A distribution is a directory below the ROS root (usually `/opt/ros`)
//! containing a `setup.sh`. ROS 2 scripts mention `AMENT_CURRENT_PREFIX` or
//! `COLCON_CURRENT_PREFIX`; ROS 1 scripts mention `catkin`.

use std::fs;
use std::path::Path;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};
use crate::prompt::Decider;

/// Sorted names of the distributions whose `setup.sh` matches `marker`.
fn distros_matching(ros_root: &Path, marker: &Regex) -> Result<Vec<String>> {
    if !ros_root.is_dir() {
        debug!("ROS root {} does not exist", ros_root.display());
        return Ok(Vec::new());
    }

    let mut distros = Vec::new();
    for entry in fs::read_dir(ros_root)? {
        let entry = entry?;
        let setup = entry.path().join("setup.sh");
        if !setup.is_file() {
            continue;
        }
        let content = match fs::read_to_string(&setup) {
            Ok(content) => content,
            Err(e) => {
                debug!("skipping {}: {}", setup.display(), e);
                continue;
            }
        };
        if marker.is_match(&content) {
            distros.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    distros.sort();
    Ok(distros)
}

/// Installed ROS 2 distributions under `ros_root`, sorted by name.
pub fn installed_ros2_distros(ros_root: &Path) -> Result<Vec<String>> {
    distros_matching(ros_root, &Regex::new("AMENT_CURRENT_PREFIX|COLCON_CURRENT_PREFIX")?)
}

/// Installed ROS 1 distributions under `ros_root`, sorted by name.
pub fn installed_ros1_distros(ros_root: &Path) -> Result<Vec<String>> {
    distros_matching(ros_root, &Regex::new("catkin")?)
}

/// The newest distribution in `distros`.
///
/// ROS releases are named in alphabetical order, so this is the last name.
pub fn newest_distro(distros: &[String]) -> Option<&str> {
    distros.iter().max().map(String::as_str)
}

/// Picks a distribution, preselecting the newest one.
///
/// With a single candidate no question is asked.
pub fn select_distro(distros: &[String], decider: &mut dyn Decider) -> Result<String> {
    let mut sorted = distros.to_vec();
    sorted.sort();

    let Some(newest) = newest_distro(&sorted) else {
        return Err(Error::Environment {
            message: "no ROS distribution found".to_string(),
        });
    };
    if sorted.len() == 1 {
        return Ok(newest.to_string());
    }

    let default = sorted.iter().position(|d| d == newest).unwrap_or_default();
    let index = decider.choose("Which ROS distribution would you like to use?", &sorted, default)?;
    sorted.get(index).cloned().ok_or_else(|| Error::Environment {
        message: format!("invalid ROS distribution choice {}", index),
    })
}
