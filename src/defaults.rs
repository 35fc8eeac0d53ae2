//! Default values for robot-folders configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Root below which ROS distributions are installed.
pub const DEFAULT_ROS_ROOT: &str = "/opt/ros";

/// Directory of a colcon workspace that holds the checkouts.
pub const SOURCE_DIR_NAME: &str = "src";

/// Default colcon options, used when the settings file does not set any.
pub const DEFAULT_COLCON_BUILD_OPTIONS: &str = "--symlink-install";

/// Default CMake flags passed through `--cmake-args`.
pub const DEFAULT_CMAKE_FLAGS: &str = "-DCMAKE_EXPORT_COMPILE_COMMANDS=1";

/// Returns the default settings file path.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/robot-folders/config.toml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/robot-folders/config.toml`
///
/// Falls back to `.robot-folders/config.toml` in the current directory if the
/// platform configuration directory cannot be determined.
///
/// This can be overridden by the `--settings` CLI flag or the
/// `ROBOT_FOLDERS_SETTINGS` environment variable.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("robot-folders"))
        .unwrap_or_else(|| PathBuf::from(".robot-folders"))
        .join("config.toml")
}
