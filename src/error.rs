//! # Error Handling
//!
//! This module defines the centralized error type for the `robot-folders`
//! library. It uses `thiserror` to derive a single `Error` enum that covers
//! every failure mode of a reconciliation pass, from descriptor parsing to
//! VCS command execution.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The variants that matter most to callers are:
//!   - `Configuration`: a repository or policy could not be resolved without
//!     more input (unknown policy value, ambiguous remote, invalid name).
//!   - `VcsOperation`: a version-control command exited unsuccessfully. It
//!     carries the repository, the operation and the exit status.
//!   - `ApplyFailed`: the aggregate raised after a full action sequence has
//!     been attempted and at least one action failed.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use thiserror::Error;

/// Main error type for robot-folders operations
#[derive(Error, Debug)]
pub enum Error {
    /// A descriptor file could not be parsed.
    ///
    /// Includes an optional hint about the accepted formats.
    #[error("Descriptor parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    DescriptorParse {
        message: String,
        /// Optional hint for how to fix the descriptor
        hint: Option<String>,
    },

    /// A repository or policy cannot be resolved without further input.
    #[error("Configuration error for {subject}: {message}")]
    Configuration { subject: String, message: String },

    /// A version-control command failed.
    #[error("VCS operation '{operation}' failed for {repository}{}: {output}", status.map(|s| format!(" (exit status {})", s)).unwrap_or_default())]
    VcsOperation {
        repository: String,
        operation: String,
        /// Exit code of the VCS process, if it ran at all
        status: Option<i32>,
        output: String,
    },

    /// One or more actions failed while applying a reconciliation plan.
    #[error("{} of {attempted} actions failed:{}", failures.len(), failures.iter().map(|f| format!("\n  - {}", f)).collect::<String>())]
    ApplyFailed {
        attempted: usize,
        failures: Vec<Error>,
    },

    /// The workspace build command failed.
    #[error("Build command '{command}' failed{}", status.map(|s| format!(" with exit status {}", s)).unwrap_or_default())]
    Build { command: String, status: Option<i32> },

    /// An environment script could not be sourced.
    #[error("Environment error: {message}")]
    Environment { message: String },

    /// The settings file is invalid.
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An interactive prompt failed, wrapped from `dialoguer::Error`.
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Builds a `Configuration` error.
    pub fn configuration(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Re-labels a `VcsOperation` error with the repository name it belongs to.
    ///
    /// The VCS client only knows paths; the adapter knows names. Other variants
    /// are returned unchanged.
    pub fn for_repository(self, name: &str) -> Self {
        match self {
            Error::VcsOperation {
                operation,
                status,
                output,
                ..
            } => Error::VcsOperation {
                repository: name.to_string(),
                operation,
                status,
                output,
            },
            other => other,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
