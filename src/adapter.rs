//! # Workspace Adapter
//!
//! This module ties the inspector and the engine to a concrete directory on
//! disk and executes the resulting plan through a `VcsClient`.
//!
//! ## Design
//!
//! `WorkspaceAdapter` owns its collaborators as trait objects, the same way
//! the rest of the crate does:
//!
//! - **`VcsClient`** for clone, remote, fetch and checkout operations.
//! - **`DirectoryRemover`** for deleting checkouts.
//!
//! `WorkspaceAdapter::new` wires up `GitCli` and `FsRemover`; tests inject
//! recording mocks through `with_operations`.
//!
//! ## Failure handling
//!
//! Every action is attempted independently. When one fails, the error is
//! recorded and the remaining actions still run, except later mutating
//! actions for the same repository, which are skipped. Once the whole
//! sequence has been attempted, all recorded failures are returned together as
//! `Error::ApplyFailed`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::descriptor::DescriptorSet;
use crate::engine::{reconcile, ReconciliationAction};
use crate::error::{Error, Result};
use crate::inspector::{self, GitInspector, Scan};
use crate::policy::{DefaultChoices, Policies};
use crate::prompt::{Decider, PromptResolver};
use crate::vcs::{GitCli, VcsClient};

/// The remote that `SetRemote` repoints.
pub const PRIMARY_REMOTE: &str = "origin";

/// Removes checkout directories.
pub trait DirectoryRemover {
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// `DirectoryRemover` backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl DirectoryRemover for FsRemover {
    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path)?;
        Ok(())
    }
}

/// Reconciles one directory of checkouts.
pub struct WorkspaceAdapter {
    root: PathBuf,
    vcs: Box<dyn VcsClient>,
    remover: Box<dyn DirectoryRemover>,
    clone_submodules: bool,
    nested: bool,
}

impl WorkspaceAdapter {
    /// Creates an adapter for `root` using the system `git`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_operations(root, Box::new(GitCli::new()), Box::new(FsRemover))
    }

    /// Creates an adapter with custom collaborators.
    pub fn with_operations(
        root: impl Into<PathBuf>,
        vcs: Box<dyn VcsClient>,
        remover: Box<dyn DirectoryRemover>,
    ) -> Self {
        Self {
            root: root.into(),
            vcs,
            remover,
            clone_submodules: true,
            nested: false,
        }
    }

    /// Whether clones also fetch submodules recursively. Defaults to `true`.
    pub fn clone_submodules(mut self, enabled: bool) -> Self {
        self.clone_submodules = enabled;
        self
    }

    /// Whether the scan looks for checkouts inside checkouts. Defaults to `false`.
    pub fn nested(mut self, enabled: bool) -> Self {
        self.nested = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the workspace and inspects every checkout.
    pub fn scan(&self, exact: bool, decider: &mut dyn Decider) -> Result<Scan> {
        let git = GitInspector::new(self.vcs.as_ref());
        inspector::scan(&self.root, self.nested, exact, &[&git], decider)
    }

    /// Describes the current workspace as a descriptor set.
    ///
    /// Fails if any checkout could not be inspected.
    pub fn scrape(&self, exact: bool, decider: &mut dyn Decider) -> Result<DescriptorSet> {
        let scan = self.scan(exact, decider)?;
        let set = scan.to_descriptor_set();
        scan.into_complete()?;
        Ok(set)
    }

    /// Scans the workspace and builds the reconciliation plan for `declared`.
    ///
    /// Checkouts that could not be inspected are reported as `Warn` actions
    /// and left out of the comparison entirely.
    pub fn plan(
        &self,
        declared: &DescriptorSet,
        policies: Policies,
        decider: &mut dyn Decider,
    ) -> Result<Vec<ReconciliationAction>> {
        let Scan {
            repositories: mut discovered,
            failures,
        } = self.scan(false, decider)?;

        let mut actions = Vec::new();
        let mut declared = declared.clone();
        for failure in failures {
            warn!("Could not inspect '{}': {}", failure.path, failure.error);
            declared.repositories.remove(&failure.path);
            discovered.remove(&failure.path);
            actions.push(ReconciliationAction::Warn {
                name: failure.path,
                message: format!("could not inspect checkout, leaving it untouched: {}", failure.error),
            });
        }

        let mut resolver = PromptResolver::new(decider);
        actions.extend(reconcile(&declared, &discovered, policies, &mut resolver)?);
        Ok(actions)
    }

    /// Brings the workspace to the declared state and returns what was done.
    pub fn adapt(
        &self,
        declared: &DescriptorSet,
        policies: Policies,
        decider: &mut dyn Decider,
    ) -> Result<Vec<ReconciliationAction>> {
        let actions = self.plan(declared, policies, decider)?;
        self.apply(&actions)?;
        Ok(actions)
    }

    /// Clones every valid declared repository, ignoring what is on disk.
    pub fn clone_all(&self, declared: &DescriptorSet) -> Result<Vec<ReconciliationAction>> {
        let actions = reconcile(declared, &BTreeMap::new(), Policies::default(), &mut DefaultChoices)?;
        self.apply(&actions)?;
        Ok(actions)
    }

    pub fn apply(&self, actions: &[ReconciliationAction]) -> Result<()> {
        self.apply_with_progress(actions, |_, _| {})
    }

    /// Applies `actions` in order, calling `progress` before each one.
    pub fn apply_with_progress<F>(&self, actions: &[ReconciliationAction], mut progress: F) -> Result<()>
    where
        F: FnMut(usize, &ReconciliationAction),
    {
        let mut failed_repositories: HashSet<&str> = HashSet::new();
        let mut failures = Vec::new();
        let mut attempted = 0;

        for (index, action) in actions.iter().enumerate() {
            progress(index, action);

            let name = action.repository();
            if !action.is_mutating() {
                debug!("{}", action);
                continue;
            }
            if failed_repositories.contains(name) {
                warn!("Not attempting to {} after an earlier failure", action);
                continue;
            }

            attempted += 1;
            if let Err(error) = self.apply_one(action) {
                warn!("Failed to {}: {}", action, error);
                failed_repositories.insert(name);
                failures.push(error);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::ApplyFailed { attempted, failures })
        }
    }

    fn apply_one(&self, action: &ReconciliationAction) -> Result<()> {
        let name = action.repository();
        let path = self.root.join(name);

        let result = match action {
            ReconciliationAction::Clone { url, version, .. } => {
                info!("Cloning {} into {}", url, path.display());
                self.vcs
                    .clone_repository(url, &path, self.clone_submodules)
                    .and_then(|()| match version {
                        Some(version) => self.vcs.checkout(&path, version),
                        None => Ok(()),
                    })
            }
            ReconciliationAction::SetRemote { url, .. } => {
                info!("Setting {} of '{}' to {}", PRIMARY_REMOTE, name, url);
                self.vcs.set_remote_url(&path, PRIMARY_REMOTE, url)
            }
            ReconciliationAction::CheckoutVersion { version, .. } => {
                info!("Checking out '{}' in '{}'", version, name);
                self.vcs
                    .fetch(&path)
                    .and_then(|()| self.vcs.checkout(&path, version))
            }
            ReconciliationAction::Delete { .. } => {
                info!("Deleting {}", path.display());
                self.remover
                    .remove_dir_all(&path)
                    .map_err(|e| Error::VcsOperation {
                        repository: name.to_string(),
                        operation: "delete".to_string(),
                        status: None,
                        output: e.to_string(),
                    })
            }
            ReconciliationAction::Skip { .. } | ReconciliationAction::Warn { .. } => Ok(()),
        };

        result.map_err(|e| e.for_repository(name))
    }
}
