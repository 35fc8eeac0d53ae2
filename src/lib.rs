//! # Robot Folders Library
//!
//! This library keeps directories of version-controlled checkouts, such as the
//! `src` directory of a ROS workspace, in line with a declarative descriptor
//! file. It is designed to be used by the `robot-folders` command-line tool but
//! can also be embedded in other tooling.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use robot_folders::descriptor;
//! use robot_folders::engine::{reconcile, ReconciliationAction};
//! use robot_folders::policy::{DefaultChoices, Policies};
//!
//! let declared = descriptor::parse(r#"
//! repositories:
//!   drivers/lidar:
//!     type: git
//!     url: https://example.com/lidar.git
//!     version: main
//! "#).unwrap();
//!
//! // Nothing on disk yet, so the plan is a single clone
//! let actions = reconcile(&declared, &BTreeMap::new(), Policies::default(), &mut DefaultChoices).unwrap();
//! assert_eq!(
//!     actions,
//!     vec![ReconciliationAction::Clone {
//!         name: "drivers/lidar".to_string(),
//!         url: "https://example.com/lidar.git".to_string(),
//!         version: Some("main".to_string()),
//!     }]
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Descriptors (`descriptor`)**: The `repositories:` file format (and the
//!   older rosinstall list) naming each repository's type, URL and version.
//! - **Inspection (`inspector`, `vcs`)**: Walks a directory, finds checkouts
//!   and reads their remote URL and current version through a `VcsClient`.
//! - **Reconciliation (`engine`, `policy`, `prompt`)**: Compares declared and
//!   discovered state and produces an ordered list of actions. Conflicts and
//!   orphaned checkouts are settled by policies, or by asking a `Decider`.
//! - **Adapter (`adapter`)**: Scans, plans and applies against a real
//!   directory, continuing past per-repository failures.
//! - **Workspaces (`workspace`, `environment`, `ros`, `settings`)**: Colcon
//!   workspace creation, environment sourcing and builds.
//!
//! ## Execution Flow
//!
//! 1.  **Scan**: Inspect every checkout below the workspace root.
//! 2.  **Plan**: Reconcile the scan with the descriptor set under the active
//!     policies.
//! 3.  **Apply**: Run the mutating actions in order; failures are collected and
//!     reported together at the end.

pub mod adapter;
pub mod defaults;
pub mod descriptor;
pub mod engine;
pub mod environment;
pub mod error;
pub mod inspector;
pub mod output;
pub mod policy;
pub mod prompt;
pub mod ros;
pub mod settings;
pub mod vcs;
pub mod workspace;

#[cfg(test)]
mod engine_proptest;
