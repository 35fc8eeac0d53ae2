//! # Local Repository Inspector
//!
//! Walks a workspace directory, finds version-control checkouts and records
//! the remote URL and version of each one.
//!
//! ## Design
//!
//! Detection and inspection are behind the `RepositoryInspector` trait, with
//! one implementation per version-control system. Only `GitInspector` exists
//! today; another backend only has to implement the trait and be passed to
//! [`scan`].
//!
//! The walk never reports the root itself and never descends into `.git`
//! directories. With `nested = false` it stops at the first checkout on each
//! branch of the tree; with `nested = true` it keeps looking inside checkouts.
//!
//! A checkout that cannot be inspected (for example several remotes and no
//! upstream to choose from) does not abort the walk. It is recorded in
//! [`Scan::failures`] so that the caller can leave it alone.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use walkdir::WalkDir;

use crate::descriptor::{DescriptorSet, RepositoryDescriptor, VcsType};
use crate::error::{Error, Result};
use crate::prompt::Decider;
use crate::vcs::{Head, VcsClient};

/// The observed state of one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalRepositoryState {
    /// Path relative to the scanned root, `/`-separated.
    pub path: String,
    #[serde(rename = "type")]
    pub vcs_type: String,
    pub url: String,
    /// Branch name, or the commit hash for detached or exact scans.
    pub version: String,
}

/// A checkout that was found but could not be inspected.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: String,
    pub error: Error,
}

/// The result of walking a workspace.
#[derive(Debug, Default)]
pub struct Scan {
    pub repositories: BTreeMap<String, LocalRepositoryState>,
    pub failures: Vec<ScanFailure>,
}

impl Scan {
    /// Returns the repositories, or the first failure if there was any.
    pub fn into_complete(self) -> Result<BTreeMap<String, LocalRepositoryState>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.repositories),
        }
    }

    /// Converts the scan into a descriptor set keyed by relative path.
    pub fn to_descriptor_set(&self) -> DescriptorSet {
        self.repositories
            .iter()
            .map(|(path, state)| {
                (
                    path.clone(),
                    RepositoryDescriptor {
                        vcs_type: VcsType::from(state.vcs_type.as_str()),
                        url: Some(state.url.clone()),
                        version: Some(state.version.clone()),
                    },
                )
            })
            .collect()
    }
}

/// Detects and inspects checkouts of one version-control system.
pub trait RepositoryInspector {
    /// The descriptor type this inspector reports, e.g. `git`.
    fn vcs_type(&self) -> &'static str;

    fn is_checkout(&self, dir: &Path) -> bool;

    /// Returns `(url, version)` for the checkout at `dir`.
    fn inspect(&self, dir: &Path, exact: bool, decider: &mut dyn Decider) -> Result<(String, String)>;
}

/// Inspects git checkouts through a `VcsClient`.
pub struct GitInspector<'a> {
    client: &'a dyn VcsClient,
}

impl<'a> GitInspector<'a> {
    pub fn new(client: &'a dyn VcsClient) -> Self {
        Self { client }
    }
}

impl RepositoryInspector for GitInspector<'_> {
    fn vcs_type(&self) -> &'static str {
        "git"
    }

    fn is_checkout(&self, dir: &Path) -> bool {
        // `.git` is a file for worktrees and submodules
        dir.join(".git").exists()
    }

    fn inspect(&self, dir: &Path, exact: bool, decider: &mut dyn Decider) -> Result<(String, String)> {
        let subject = dir.display().to_string();
        let remotes = self.client.list_remotes(dir)?;
        let head = self.client.current_head(dir)?;

        let remote = match remotes.len() {
            0 => return Err(Error::configuration(subject, "checkout has no remote configured")),
            1 => &remotes[0],
            _ => {
                info!("Found multiple remotes for repo {}.", subject);
                let default = match &head {
                    Head::Branch(branch) => {
                        let upstream = self.client.upstream_remote(dir, branch)?.ok_or_else(|| {
                            Error::configuration(
                                &subject,
                                format!(
                                    "branch \"{}\" does not have a tracking branch configured; cannot pick a remote",
                                    branch
                                ),
                            )
                        })?;
                        remotes.iter().position(|r| r.name == upstream)
                    }
                    Head::Detached => None,
                };

                let choice = decider.choose_remote(dir, &remotes, default)?;
                remotes.get(choice).ok_or_else(|| {
                    Error::configuration(
                        &subject,
                        format!("invalid remote choice {} of {}", choice, remotes.len()),
                    )
                })?
            }
        };

        let version = match head {
            Head::Branch(branch) if !exact => branch,
            _ => self.client.head_commit(dir)?,
        };

        Ok((remote.url.clone(), version))
    }
}

/// Relative, `/`-separated form of `path` below `root`.
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Walks `root` and inspects every checkout the inspectors recognise.
///
/// A missing `root` holds no checkouts. Directory walk errors abort the scan.
/// Inspection errors are collected per checkout.
pub fn scan(
    root: &Path,
    nested: bool,
    exact: bool,
    inspectors: &[&dyn RepositoryInspector],
    decider: &mut dyn Decider,
) -> Result<Scan> {
    let mut result = Scan::default();
    if !root.exists() {
        debug!("{} does not exist, nothing to scan", root.display());
        return Ok(result);
    }
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == ".git" {
            walker.skip_current_dir();
            continue;
        }

        let dir: PathBuf = entry.into_path();
        let Some(inspector) = inspectors.iter().find(|i| i.is_checkout(&dir)) else {
            continue;
        };

        let name = relative_name(root, &dir);
        debug!("found {} checkout at {}", inspector.vcs_type(), name);

        match inspector.inspect(&dir, exact, decider) {
            Ok((url, version)) => {
                result.repositories.insert(
                    name.clone(),
                    LocalRepositoryState {
                        path: name,
                        vcs_type: inspector.vcs_type().to_string(),
                        url,
                        version,
                    },
                );
            }
            Err(error) => result.failures.push(ScanFailure { path: name, error }),
        }

        if !nested {
            walker.skip_current_dir();
        }
    }

    Ok(result)
}
