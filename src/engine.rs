//! # Reconciliation Engine
//!
//! Compares a declared [`DescriptorSet`] against the checkouts found on disk
//! and produces the ordered list of [`ReconciliationAction`]s that would bring
//! the workspace to the declared state.
//!
//! The engine performs no I/O. Every decision that a policy leaves open is
//! delegated to the caller's [`ConflictResolver`], so `reconcile` is a pure
//! function of its inputs and the resolver's answers. Calling it twice with
//! the same inputs yields the same plan.
//!
//! ## Per-repository algorithm
//!
//! For each declared repository, in name order:
//!
//! 1. Non-git types, missing URLs and unsafe names are skipped.
//! 2. Repositories without a checkout are cloned.
//! 3. For existing checkouts the version is compared first, then the URL.
//!    Each differing field is resolved under the override policy. A
//!    `SetRemote` is always emitted before the `CheckoutVersion` of the same
//!    repository.
//!
//! Checkouts that are not declared are then resolved under the delete policy.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Component, Path};

use log::{debug, info, warn};
use serde::Serialize;

use crate::descriptor::{DescriptorSet, RepositoryDescriptor};
use crate::error::Result;
use crate::inspector::LocalRepositoryState;
use crate::policy::{resolve_field, resolve_orphan, Choice, Conflict, ConflictResolver, Policies};

/// One step of a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconciliationAction {
    /// Clone `url` into the checkout `name`, then check out `version` if given.
    Clone {
        name: String,
        url: String,
        version: Option<String>,
    },
    /// Point the `origin` remote of the checkout at `url`.
    SetRemote { path: String, url: String },
    /// Fetch, then check out `version`.
    CheckoutVersion { path: String, version: String },
    /// Remove the checkout directory.
    Delete { path: String },
    Skip { name: String, reason: String },
    Warn { name: String, message: String },
}

impl ReconciliationAction {
    /// The repository name the action refers to.
    pub fn repository(&self) -> &str {
        match self {
            ReconciliationAction::Clone { name, .. }
            | ReconciliationAction::Skip { name, .. }
            | ReconciliationAction::Warn { name, .. } => name,
            ReconciliationAction::SetRemote { path, .. }
            | ReconciliationAction::CheckoutVersion { path, .. }
            | ReconciliationAction::Delete { path } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReconciliationAction::Clone { .. } => "clone",
            ReconciliationAction::SetRemote { .. } => "set_remote",
            ReconciliationAction::CheckoutVersion { .. } => "checkout_version",
            ReconciliationAction::Delete { .. } => "delete",
            ReconciliationAction::Skip { .. } => "skip",
            ReconciliationAction::Warn { .. } => "warn",
        }
    }

    /// Whether applying the action touches the filesystem.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            ReconciliationAction::Skip { .. } | ReconciliationAction::Warn { .. }
        )
    }
}

impl fmt::Display for ReconciliationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationAction::Clone {
                name,
                url,
                version: Some(version),
            } => write!(f, "clone {} from {} at {}", name, url, version),
            ReconciliationAction::Clone { name, url, version: None } => {
                write!(f, "clone {} from {}", name, url)
            }
            ReconciliationAction::SetRemote { path, url } => write!(f, "set remote of {} to {}", path, url),
            ReconciliationAction::CheckoutVersion { path, version } => {
                write!(f, "check out {} in {}", version, path)
            }
            ReconciliationAction::Delete { path } => write!(f, "delete {}", path),
            ReconciliationAction::Skip { name, reason } => write!(f, "skip {}: {}", name, reason),
            ReconciliationAction::Warn { name, message } => write!(f, "warning for {}: {}", name, message),
        }
    }
}

/// The name with every component other than a normal one dropped, joined by `/`.
fn canonical_name(name: &str) -> String {
    Path::new(name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// A relative path with only normal components, spelled the way the
/// inspector reports checkouts.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        && canonical_name(name) == name
}

fn skip(name: &str, reason: &str) -> ReconciliationAction {
    warn!("Skipping package '{}': {}", name, reason);
    ReconciliationAction::Skip {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn warning(name: &str, message: String) -> ReconciliationAction {
    warn!("Package '{}': {}", name, message);
    ReconciliationAction::Warn {
        name: name.to_string(),
        message,
    }
}

/// Builds the reconciliation plan.
///
/// The only errors are those returned by `resolver`.
pub fn reconcile(
    declared: &DescriptorSet,
    discovered: &BTreeMap<String, LocalRepositoryState>,
    policies: Policies,
    resolver: &mut dyn ConflictResolver,
) -> Result<Vec<ReconciliationAction>> {
    let mut actions = Vec::new();

    for (name, descriptor) in declared.iter() {
        debug!("checking '{}'", name);
        reconcile_one(name, descriptor, discovered.get(name), policies, resolver, &mut actions)?;
    }

    // a checkout declared under a non-canonical spelling is skipped above, never deleted
    let spelled_differently: HashSet<String> = declared
        .iter()
        .map(|(name, _)| canonical_name(name))
        .filter(|canonical| !declared.contains(canonical))
        .collect();

    for name in discovered.keys().filter(|name| !declared.contains(name)) {
        if spelled_differently.contains(name.as_str()) {
            warn!(
                "Keeping package '{}', it is declared under a different spelling of its path",
                name
            );
            continue;
        }
        let orphan = Conflict::Orphan { name };
        match resolve_orphan(policies.delete_policy, &orphan, resolver)? {
            Choice::TakeDeclared => {
                info!(
                    "Package '{}' is not in the descriptor set and will be deleted",
                    name
                );
                actions.push(ReconciliationAction::Delete { path: name.clone() });
            }
            Choice::KeepLocal => {
                info!("Keeping local package '{}' that is not in the descriptor set", name);
            }
        }
    }

    Ok(actions)
}

fn reconcile_one(
    name: &str,
    descriptor: &RepositoryDescriptor,
    local: Option<&LocalRepositoryState>,
    policies: Policies,
    resolver: &mut dyn ConflictResolver,
    actions: &mut Vec<ReconciliationAction>,
) -> Result<()> {
    if !descriptor.vcs_type.is_git() {
        actions.push(skip(
            name,
            &format!(
                "unsupported type '{}', only 'git' is supported",
                descriptor.vcs_type
            ),
        ));
        return Ok(());
    }

    let Some(url) = descriptor.url.as_deref() else {
        actions.push(skip(name, "missing url"));
        return Ok(());
    };

    if !is_safe_name(name) {
        actions.push(skip(name, "invalid repository path"));
        return Ok(());
    }

    let version = descriptor.requested_version();
    if version.is_none() {
        warn!(
            "No version given for package '{}'. The local version will be kept or the default branch will be checked out for a new package",
            name
        );
    }

    let Some(local) = local else {
        actions.push(ReconciliationAction::Clone {
            name: name.to_string(),
            url: url.to_string(),
            version: version.map(str::to_string),
        });
        return Ok(());
    };

    if local.vcs_type != "git" {
        actions.push(warning(
            name,
            format!(
                "declared as git but the checkout is '{}', leaving it untouched",
                local.vcs_type
            ),
        ));
        return Ok(());
    }

    let mut checkout = None;
    if let Some(version) = version.filter(|v| *v != local.version) {
        let conflict = Conflict::Version {
            name,
            local: &local.version,
            declared: version,
        };
        let choice = resolve_field(policies.override_policy, &conflict, resolver)?;
        let resulting = choice.pick(&local.version, version);
        match choice {
            Choice::TakeDeclared => {
                info!(
                    "Package '{}' version will change from '{}' to '{}'",
                    name, local.version, resulting
                );
                checkout = Some(ReconciliationAction::CheckoutVersion {
                    path: name.to_string(),
                    version: resulting.to_string(),
                });
            }
            Choice::KeepLocal => {
                info!(
                    "Package '{}' keeps local version '{}' instead of '{}'",
                    name, resulting, version
                );
            }
        }
    }

    if url != local.url {
        let conflict = Conflict::Url {
            name,
            local: &local.url,
            declared: url,
        };
        let choice = resolve_field(policies.override_policy, &conflict, resolver)?;
        let resulting = choice.pick(&local.url, url);
        match choice {
            Choice::TakeDeclared => {
                info!(
                    "Package '{}' remote will change from '{}' to '{}'",
                    name, local.url, resulting
                );
                actions.push(ReconciliationAction::SetRemote {
                    path: name.to_string(),
                    url: resulting.to_string(),
                });
            }
            Choice::KeepLocal => {
                info!(
                    "Package '{}' keeps local url '{}' instead of '{}'",
                    name, resulting, url
                );
            }
        }
    }

    actions.extend(checkout);
    Ok(())
}
